//! Message Codecs
//!
//! One [`FormatCodec`] per wire format, selected once with [`codec_for`].
//!
//! | Format | Shape | Field addressing |
//! |---|---|---|
//! | ASTM | flat, `\n` separated | 1-based position |
//! | HL7 | flat, `\r\n` separated, MSH offset | 1-based position |
//! | POCT1-A | nested XML | attribute per field |
//! | Generic XML | nested XML in `<Request>`/`<Result>` | `@attr`, `text()` |
//!
//! `serialize` reads the store's roots and their subtrees; flat formats
//! write roots only. `parse` produces id-less trees for the caller to
//! materialize, and never touches a store itself.

mod astm;
mod error;
mod generic_xml;
mod hl7;
mod poct1a;
mod positional;
pub(crate) mod xml;

pub use astm::AstmCodec;
pub use error::CodecError;
pub use generic_xml::{Envelope, GenericXmlCodec};
pub use hl7::Hl7Codec;
pub use poct1a::Poct1aCodec;

use crate::config::BuilderConfig;
use crate::models::{DetachedNode, MessageFormat};
use crate::store::NodeStore;

/// Bidirectional transform between a node tree and one format's text
pub trait FormatCodec: Send + Sync {
    fn format(&self) -> MessageFormat;

    /// Whether nodes nest below the root level in this format
    fn is_hierarchical(&self) -> bool {
        self.format().is_hierarchical()
    }

    fn serialize(&self, store: &NodeStore) -> String;

    /// Parse text into root-level trees
    ///
    /// # Errors
    ///
    /// - `Parse` when the text is not valid for this format
    /// - `EmptyResult` when it is valid but yields no records
    fn parse(&self, text: &str) -> Result<Vec<DetachedNode>, CodecError>;
}

/// Codec for `format`, using the XML envelope tags from `config`
pub fn codec_for(format: MessageFormat, config: &BuilderConfig) -> Box<dyn FormatCodec> {
    let wrappers = config.xml_wrapper_tags.clone();
    match format {
        MessageFormat::Astm => Box::new(AstmCodec),
        MessageFormat::Hl7 => Box::new(Hl7Codec),
        MessageFormat::Poct1a => Box::new(Poct1aCodec::new(wrappers)),
        MessageFormat::XmlRequest => Box::new(GenericXmlCodec::new(Envelope::Request, wrappers)),
        MessageFormat::XmlResult => Box::new(GenericXmlCodec::new(Envelope::Result, wrappers)),
    }
}

/// Serialize `store` as `format` with default settings
pub fn serialize(format: MessageFormat, store: &NodeStore) -> String {
    codec_for(format, &BuilderConfig::default()).serialize(store)
}

/// Parse `text` as `format` with default settings
pub fn parse(format: MessageFormat, text: &str) -> Result<Vec<DetachedNode>, CodecError> {
    codec_for(format, &BuilderConfig::default()).parse(text)
}
