//! Document Session
//!
//! A [`Document`] is one message being edited: the node tree, its
//! undo/redo history, a clipboard, the current format and the optional XSD
//! schema that drives the XML formats. Every state the builder can be in
//! lives here, so independent documents never share anything.
//!
//! # Recording
//!
//! Each undoable edit snapshots the tree before it runs. The snapshot is
//! pushed onto the history only if the edit succeeds and reports a change;
//! a refused or empty edit leaves both the tree and the history alone.
//! Expanding or collapsing nodes is presentation state and never recorded.

mod error;

pub use error::{DocumentError, DocumentResult};

use crate::codec::{codec_for, FormatCodec};
use crate::config::BuilderConfig;
use crate::hierarchy::HierarchyResolver;
use crate::history::HistoryManager;
use crate::models::{DetachedNode, Field, MessageFormat, NodeId, Snapshot};
use crate::operations::{Direction, InsertParams, OperationError, OperationResult, TreeOperations};
use crate::schema::{SchemaLoader, SchemaMap};
use crate::store::NodeStore;
use crate::templates::Template;
use std::path::Path;
use tracing::{debug, info, warn};

pub struct Document {
    store: NodeStore,
    history: HistoryManager,
    clipboard: Option<DetachedNode>,
    format: MessageFormat,
    codec: Box<dyn FormatCodec>,
    resolver: HierarchyResolver,
    config: BuilderConfig,
    unsaved: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::build(BuilderConfig::default())
    }
}

impl Document {
    /// Empty document with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty document using `config`
    ///
    /// # Errors
    ///
    /// `Config` if the configuration does not validate.
    pub fn with_config(config: BuilderConfig) -> DocumentResult<Self> {
        config.validate().map_err(DocumentError::Config)?;
        Ok(Self::build(config))
    }

    fn build(config: BuilderConfig) -> Self {
        let format = config.default_format;
        Self {
            store: NodeStore::new(),
            history: HistoryManager::new(config.max_undo_depth),
            clipboard: None,
            format,
            codec: codec_for(format, &config),
            resolver: HierarchyResolver::new(),
            config,
            unsaved: false,
        }
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn format(&self) -> MessageFormat {
        self.format
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn resolver(&self) -> &HierarchyResolver {
        &self.resolver
    }

    pub fn clipboard(&self) -> Option<&DetachedNode> {
        self.clipboard.as_ref()
    }

    /// Whether the tree changed since the last template save or load
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// Switch the output format
    ///
    /// Moving between incompatible formats (say ASTM to HL7) clears the
    /// tree first; the clear is undoable. Returns how many nodes were
    /// removed.
    pub fn set_format(&mut self, format: MessageFormat) -> usize {
        let mut removed = 0;
        if !self.store.is_empty() && !self.format.is_compatible_with(format) {
            let before = self.store.snapshot();
            removed = TreeOperations::new(&mut self.store).clear();
            self.record(before);
            info!(from = %self.format, to = %format, removed, "Cleared tree for incompatible format");
        }
        self.switch_format(format);
        removed
    }

    fn switch_format(&mut self, format: MessageFormat) {
        if self.format != format {
            self.format = format;
            self.codec = codec_for(format, &self.config);
        }
    }

    /// Serialize the tree in the current format
    pub fn render(&self) -> String {
        self.codec.serialize(&self.store)
    }

    // Tree edits

    pub fn insert(&mut self, params: InsertParams) -> DocumentResult<NodeId> {
        self.mutate(|ops| ops.insert(params), |_| true)
    }

    /// Add a node of the default type for its position
    ///
    /// The root of a new POCT1-A message gets the first message type, a
    /// child gets the first type its parent allows.
    pub fn add_node(&mut self, parent: Option<&NodeId>) -> DocumentResult<NodeId> {
        let node_type = self.default_child_type(parent)?;
        let mut params = InsertParams::new(node_type);
        params.parent_id = parent.cloned();
        self.insert(params)
    }

    pub fn delete(&mut self, id: &NodeId) -> DocumentResult<Vec<NodeId>> {
        self.mutate(|ops| ops.delete(id), |_| true)
    }

    pub fn move_node(&mut self, id: &NodeId, direction: Direction) -> DocumentResult<bool> {
        self.mutate(|ops| ops.move_node(id, direction), |moved| *moved)
    }

    pub fn reparent(
        &mut self,
        id: &NodeId,
        new_parent: Option<&NodeId>,
        position: Option<usize>,
    ) -> DocumentResult<()> {
        self.mutate(|ops| ops.reparent(id, new_parent, position), |_| true)
    }

    pub fn duplicate(&mut self, id: &NodeId) -> DocumentResult<NodeId> {
        self.mutate(|ops| ops.duplicate(id), |_| true)
    }

    /// Put a copy of the subtree at `id` on the clipboard
    pub fn copy(&mut self, id: &NodeId) -> DocumentResult<()> {
        let content = TreeOperations::new(&mut self.store).copy(id)?;
        debug!(node_id = %id, nodes = content.subtree_len(), "Copied subtree");
        self.clipboard = Some(content);
        Ok(())
    }

    /// Paste the clipboard under `parent` (`None` = root)
    ///
    /// The clipboard is kept, so the same content can be pasted repeatedly.
    pub fn paste(&mut self, parent: Option<&NodeId>) -> DocumentResult<NodeId> {
        let content = self
            .clipboard
            .clone()
            .ok_or(OperationError::ClipboardEmpty)?;
        self.mutate(|ops| ops.paste(&content, parent), |_| true)
    }

    pub fn set_type(&mut self, id: &NodeId, node_type: &str) -> DocumentResult<bool> {
        self.mutate(|ops| ops.set_type(id, node_type), |changed| *changed)
    }

    pub fn set_custom_type(&mut self, id: &NodeId, name: &str) -> DocumentResult<bool> {
        self.mutate(|ops| ops.set_custom_type(id, name), |changed| *changed)
    }

    pub fn set_field(&mut self, id: &NodeId, index: usize, field: Field) -> DocumentResult<bool> {
        self.mutate(|ops| ops.set_field(id, index, field), |changed| *changed)
    }

    pub fn add_field(&mut self, id: &NodeId) -> DocumentResult<usize> {
        let format = self.format;
        self.mutate(|ops| ops.add_field(id, format), |_| true)
    }

    pub fn remove_field(&mut self, id: &NodeId, index: usize) -> DocumentResult<Field> {
        self.mutate(|ops| ops.remove_field(id, index), |_| true)
    }

    /// Remove every node; clearing an empty tree records nothing
    pub fn clear(&mut self) -> usize {
        let before = self.store.snapshot();
        let removed = TreeOperations::new(&mut self.store).clear();
        if removed > 0 {
            self.record(before);
        }
        removed
    }

    pub fn set_expanded(&mut self, id: &NodeId, expanded: bool) -> DocumentResult<()> {
        Ok(TreeOperations::new(&mut self.store).set_expanded(id, expanded)?)
    }

    pub fn set_all_expanded(&mut self, expanded: bool) {
        TreeOperations::new(&mut self.store).set_all_expanded(expanded);
    }

    // History

    pub fn undo(&mut self) -> DocumentResult<bool> {
        let undone = self.history.undo(&mut self.store)?;
        if undone {
            self.unsaved = true;
        }
        Ok(undone)
    }

    pub fn redo(&mut self) -> DocumentResult<bool> {
        let redone = self.history.redo(&mut self.store)?;
        if redone {
            self.unsaved = true;
        }
        Ok(redone)
    }

    // Import and persistence

    /// Replace the tree with the message in `text`, read as `format`
    ///
    /// On success the document switches to `format` and the previous tree
    /// becomes an undo step. Returns the number of root nodes imported.
    ///
    /// # Errors
    ///
    /// `Codec(Parse)` or `Codec(EmptyResult)`; the document is untouched.
    pub fn import(&mut self, text: &str, format: MessageFormat) -> DocumentResult<usize> {
        let roots = codec_for(format, &self.config)
            .parse(text)
            .map_err(|e| {
                warn!(%format, error = %e, "Import rejected");
                e
            })?;

        self.replace_with_trees(&roots)?;
        self.switch_format(format);
        info!(%format, roots = roots.len(), nodes = self.store.len(), "Imported message");
        Ok(roots.len())
    }

    /// Import a file's contents in the current format
    ///
    /// # Errors
    ///
    /// `UnsupportedExtension` when the file name's extension is not one the
    /// current format reads, otherwise as [`Document::import`].
    pub fn import_file(&mut self, file_name: &str, text: &str) -> DocumentResult<usize> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();
        if !self.format.accepts_extension(&extension) {
            return Err(DocumentError::unsupported_extension(self.format, extension));
        }
        self.import(text, self.format)
    }

    /// Plain-data copy of the whole tree
    pub fn export_snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// Replace the tree with `snapshot`, keeping its ids
    ///
    /// # Errors
    ///
    /// `Store` if the snapshot has duplicate ids, dangling parents or a
    /// cycle; the document is untouched.
    pub fn replace_from_snapshot(&mut self, snapshot: Snapshot) -> DocumentResult<()> {
        let before = self.store.snapshot();
        self.store.replace_with(snapshot)?;
        self.record(before);
        Ok(())
    }

    /// Replace the tree with a template's nodes under fresh ids
    ///
    /// Switches to the template's format and clears the unsaved flag.
    /// Returns the number of nodes loaded.
    pub fn load_template(&mut self, template: &Template) -> DocumentResult<usize> {
        let staged = NodeStore::from_snapshot(template.nodes.clone())?;
        let roots = staged
            .root_nodes()
            .into_iter()
            .map(|root| staged.detach_copy(&root.id))
            .collect::<Result<Vec<_>, _>>()?;

        self.replace_with_trees(&roots)?;
        self.switch_format(template.format);
        self.unsaved = false;
        info!(template = %template.name, nodes = self.store.len(), "Loaded template");
        Ok(self.store.len())
    }

    /// Capture the current tree as a new user template
    ///
    /// # Errors
    ///
    /// `Template(TooLarge)` when the template would not fit the configured
    /// storage ceiling.
    pub fn save_as_template(&mut self, name: &str) -> DocumentResult<Template> {
        let template = Template::new(name.trim(), self.format, self.store.snapshot());
        template.to_json(self.config.max_template_bytes)?;
        self.unsaved = false;
        info!(key = %template.key, nodes = template.nodes.len(), "Saved template");
        Ok(template)
    }

    // Schema

    /// Load an XSD that drives the XML formats' vocabulary
    ///
    /// Returns the number of element types found. A failed load keeps any
    /// previously loaded schema.
    pub fn load_schema(&mut self, xsd: &str) -> DocumentResult<usize> {
        let schema = SchemaLoader::load(xsd)?;
        let count = schema.len();
        self.resolver.set_schema(Some(schema));
        Ok(count)
    }

    pub fn clear_schema(&mut self) {
        self.resolver.set_schema(None);
    }

    pub fn schema(&self) -> Option<&SchemaMap> {
        self.resolver.schema()
    }

    /// Types the editor should offer for a child of `parent`
    pub fn allowed_child_types(&self, parent: Option<&NodeId>) -> DocumentResult<Vec<String>> {
        let parent_type = self.parent_type(parent)?;
        Ok(self.resolver.allowed_child_types(self.format, parent_type))
    }

    pub fn can_have_children(&self, id: &NodeId) -> DocumentResult<bool> {
        let node_type = self.parent_type(Some(id))?.unwrap_or_default();
        Ok(self.resolver.can_have_children(self.format, node_type))
    }

    fn default_child_type(&self, parent: Option<&NodeId>) -> DocumentResult<String> {
        let parent_type = self.parent_type(parent)?;
        Ok(self.resolver.default_child_type(self.format, parent_type))
    }

    fn parent_type(&self, parent: Option<&NodeId>) -> DocumentResult<Option<&str>> {
        let Some(id) = parent else {
            return Ok(None);
        };
        let node = self
            .store
            .get(id)
            .ok_or_else(|| OperationError::node_not_found(id))?;
        Ok(Some(node.node_type.as_str()))
    }

    fn mutate<T>(
        &mut self,
        op: impl FnOnce(&mut TreeOperations<'_>) -> OperationResult<T>,
        changed: impl FnOnce(&T) -> bool,
    ) -> DocumentResult<T> {
        let before = self.store.snapshot();
        let out = op(&mut TreeOperations::new(&mut self.store))?;
        if changed(&out) {
            self.record(before);
        }
        Ok(out)
    }

    fn record(&mut self, before: Snapshot) {
        self.history.push(before);
        self.unsaved = true;
    }

    /// Swap in freshly materialized trees as one undoable step
    fn replace_with_trees(&mut self, roots: &[DetachedNode]) -> DocumentResult<()> {
        let before = self.store.snapshot();
        self.store.clear();
        for root in roots {
            if let Err(e) = self.store.materialize(root, None, None) {
                self.store.replace_with(before)?;
                return Err(e.into());
            }
        }
        self.record(before);
        Ok(())
    }
}
