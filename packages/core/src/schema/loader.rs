//! XSD → SchemaMap
//!
//! Reads only the parts of an XSD the hierarchy resolver needs:
//!
//! - every named `complexType`, collecting the attributes and element
//!   references found anywhere beneath it
//! - every top-level `element` not already named by a complex type, taking
//!   its child list from its declared `type` or from an inline anonymous
//!   `complexType`
//!
//! Namespace prefixes (`xs:`, `xsd:`, `tns:`) are ignored throughout.

use crate::codec::xml::{read_elements, strip_prefix, XmlElement};
use crate::schema::{AttributeInfo, SchemaEntry, SchemaError, SchemaMap};
use tracing::debug;

pub struct SchemaLoader;

impl SchemaLoader {
    /// Build a schema map from XSD text
    ///
    /// # Errors
    ///
    /// - `Malformed` for unparseable markup
    /// - `NotASchema` when the document element is not `schema`
    /// - `NoDefinitions` when nothing usable is declared
    ///
    /// # Examples
    ///
    /// ```rust
    /// use smartmsg_core::schema::SchemaLoader;
    ///
    /// let map = SchemaLoader::load(r#"
    ///     <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
    ///       <xs:complexType name="Order">
    ///         <xs:sequence><xs:element ref="Test"/></xs:sequence>
    ///         <xs:attribute name="id" type="xs:string" use="required"/>
    ///       </xs:complexType>
    ///     </xs:schema>"#).unwrap();
    ///
    /// assert_eq!(map.children_of("Order"), Some(&["Test".to_string()][..]));
    /// ```
    pub fn load(xsd: &str) -> Result<SchemaMap, SchemaError> {
        let roots = read_elements(xsd).map_err(SchemaError::malformed)?;
        let root = roots.first().ok_or(SchemaError::NoDefinitions)?;
        if root.local_name() != "schema" {
            return Err(SchemaError::not_a_schema(root.name.clone()));
        }

        let mut map = SchemaMap::default();

        let mut complex_types = Vec::new();
        collect_named_complex_types(root, &mut complex_types);
        for complex_type in complex_types {
            if let Some(name) = complex_type.attribute("name") {
                map.insert(name, entry_from_complex_type(complex_type));
            }
        }

        for element in root.children.iter().filter(|c| c.local_name() == "element") {
            let Some(name) = element.attribute("name") else {
                continue;
            };
            if map.contains(name) {
                continue;
            }

            let entry = match element.attribute("type") {
                Some(type_name) => map
                    .get(strip_prefix(type_name))
                    .cloned()
                    .unwrap_or_default(),
                None => element
                    .children
                    .iter()
                    .find(|c| c.local_name() == "complexType")
                    .map(entry_from_complex_type)
                    .unwrap_or_default(),
            };
            map.insert(name, entry);
        }

        if map.is_empty() {
            return Err(SchemaError::NoDefinitions);
        }

        debug!(types = map.len(), "Loaded XSD schema");
        Ok(map)
    }
}

fn collect_named_complex_types<'a>(element: &'a XmlElement, out: &mut Vec<&'a XmlElement>) {
    for child in &element.children {
        if child.local_name() == "complexType" && child.attribute("name").is_some() {
            out.push(child);
        }
        collect_named_complex_types(child, out);
    }
}

fn entry_from_complex_type(complex_type: &XmlElement) -> SchemaEntry {
    let mut entry = SchemaEntry::default();
    collect_members(complex_type, &mut entry);
    entry
}

fn collect_members(element: &XmlElement, entry: &mut SchemaEntry) {
    for child in &element.children {
        match child.local_name() {
            "attribute" => {
                if let Some(name) = child.attribute("name").or(child.attribute("ref")) {
                    entry.attributes.push(AttributeInfo {
                        name: strip_prefix(name).to_string(),
                        attr_type: child.attribute("type").map(str::to_string),
                        required: child.attribute("use") == Some("required"),
                    });
                }
            }
            "element" => {
                if let Some(reference) = child.attribute("ref").or(child.attribute("name")) {
                    entry.children.push(strip_prefix(reference).to_string());
                }
            }
            _ => {}
        }
        collect_members(child, entry);
    }
}
