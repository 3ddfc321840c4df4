/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Schema definitions for FAST templates.
//!
//! This module defines the structures that describe the binary feed:
//! - [`WireType`]: How a field value is laid out on the wire
//! - [`Operator`]: How a field relates to previous messages
//! - [`FieldDescriptor`]: One field of a template
//! - [`Template`]: An ordered list of fields selected by template id
//! - [`TemplateCatalog`]: All templates known for a feed

use crate::error::DictionaryError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Default number of decimal places applied to price mantissas.
pub const DEFAULT_PRICE_EXPONENT: u32 = 2;

/// Wire representation of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WireType {
    /// Stop-bit terminated ASCII string.
    Ascii,
    /// Unsigned stop-bit integer.
    UnsignedInt,
    /// Signed stop-bit integer.
    SignedInt,
    /// Signed stop-bit mantissa scaled by the configured exponent.
    Decimal,
}

impl WireType {
    /// Returns true if this type carries an integer on the wire.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        !matches!(self, Self::Ascii)
    }
}

impl std::str::FromStr for WireType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ascii" | "string" => Ok(Self::Ascii),
            "unsignedint" | "uint32" | "uint64" => Ok(Self::UnsignedInt),
            "signedint" | "int32" | "int64" => Ok(Self::SignedInt),
            "decimal" => Ok(Self::Decimal),
            other => Err(format!("unknown wire type: {other}")),
        }
    }
}

/// FAST field operator types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    /// No operator - value is always present in the stream.
    #[default]
    None,
    /// Constant - value is never in the stream.
    Constant,
    /// Copy - if absent, use previous value from the dictionary.
    Copy,
    /// Tail - value in stream replaces the tail of the previous value.
    Tail,
    /// Delta - value in stream is a signed delta from the previous value.
    Delta,
}

impl Operator {
    /// Returns true if this operator keeps state in the field dictionary.
    #[must_use]
    pub const fn uses_dictionary(&self) -> bool {
        matches!(self, Self::Copy | Self::Tail | Self::Delta)
    }

    /// Returns true if this operator consumes a presence map bit.
    #[must_use]
    pub const fn requires_pmap(&self) -> bool {
        self.uses_dictionary()
    }
}

/// One field of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Field id (FIX tag number).
    pub id: u32,
    /// Semantic name.
    pub name: String,
    /// Wire representation.
    #[serde(rename = "type")]
    pub wire_type: WireType,
    /// Field operator.
    #[serde(default)]
    pub operator: Operator,
    /// Fixed value for Constant fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant_value: Option<String>,
    /// Decimal places applied to this field's mantissa.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exponent: Option<u32>,
}

impl FieldDescriptor {
    /// Creates a new field descriptor with no operator.
    ///
    /// # Arguments
    /// * `id` - The field id
    /// * `name` - The field name
    /// * `wire_type` - The wire representation
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>, wire_type: WireType) -> Self {
        Self {
            id,
            name: name.into(),
            wire_type,
            operator: Operator::None,
            constant_value: None,
            exponent: None,
        }
    }

    /// Sets the field operator.
    #[must_use]
    pub const fn with_operator(mut self, operator: Operator) -> Self {
        self.operator = operator;
        self
    }

    /// Makes this a Constant field with the given value.
    #[must_use]
    pub fn with_constant(mut self, value: impl Into<String>) -> Self {
        self.operator = Operator::Constant;
        self.constant_value = Some(value.into());
        self
    }

    /// Sets the decimal exponent for this field.
    #[must_use]
    pub const fn with_exponent(mut self, exponent: u32) -> Self {
        self.exponent = Some(exponent);
        self
    }

    fn validate(&self, template_id: u32) -> Result<(), DictionaryError> {
        if self.operator == Operator::Constant && self.constant_value.is_none() {
            return Err(DictionaryError::MissingConstant {
                template_id,
                field_id: self.id,
            });
        }
        if self.operator == Operator::Delta && !self.wire_type.is_numeric() {
            return Err(DictionaryError::InvalidField {
                template_id,
                field_id: self.id,
                reason: "delta operator requires a numeric wire type".to_string(),
            });
        }
        if let Some(exponent) = self.exponent
            && exponent > 28
        {
            return Err(DictionaryError::InvalidField {
                template_id,
                field_id: self.id,
                reason: format!("exponent {exponent} exceeds 28"),
            });
        }
        Ok(())
    }
}

/// Message layout selected by template id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Template id.
    pub id: u32,
    /// Template name.
    #[serde(default)]
    pub name: String,
    /// Fields in wire order.
    pub fields: Vec<FieldDescriptor>,
    /// Decimal places for price fields that declare no exponent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_exponent: Option<u32>,
}

impl Template {
    /// Creates a new template.
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            id,
            name: name.into(),
            fields,
            price_exponent: None,
        }
    }

    /// Sets the template-wide price exponent.
    #[must_use]
    pub const fn with_price_exponent(mut self, exponent: u32) -> Self {
        self.price_exponent = Some(exponent);
        self
    }

    /// Returns the number of presence map bits a full message consumes.
    #[must_use]
    pub fn pmap_bits(&self) -> usize {
        self.fields
            .iter()
            .filter(|f| f.operator.requires_pmap())
            .count()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogFile {
    #[serde(default = "default_price_exponent")]
    default_price_exponent: u32,
    templates: Vec<Template>,
}

const fn default_price_exponent() -> u32 {
    DEFAULT_PRICE_EXPONENT
}

/// All templates known for a feed, indexed by template id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateCatalog {
    templates: HashMap<u32, Template>,
    default_price_exponent: u32,
}

impl TemplateCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
            default_price_exponent: DEFAULT_PRICE_EXPONENT,
        }
    }

    /// Sets the catalog-wide default price exponent.
    #[must_use]
    pub const fn with_default_price_exponent(mut self, exponent: u32) -> Self {
        self.default_price_exponent = exponent;
        self
    }

    /// Adds a template, validating its fields.
    ///
    /// # Errors
    /// Returns `DictionaryError` if the id is taken or a field is invalid.
    pub fn add_template(&mut self, template: Template) -> Result<(), DictionaryError> {
        if self.templates.contains_key(&template.id) {
            return Err(DictionaryError::DuplicateTemplate(template.id));
        }
        for field in &template.fields {
            field.validate(template.id)?;
        }
        self.templates.insert(template.id, template);
        Ok(())
    }

    /// Builder form of [`add_template`](Self::add_template).
    ///
    /// # Errors
    /// Returns `DictionaryError` if the template is rejected.
    pub fn with_template(mut self, template: Template) -> Result<Self, DictionaryError> {
        self.add_template(template)?;
        Ok(self)
    }

    /// Parses and validates a catalog from JSON.
    ///
    /// # Errors
    /// Returns `DictionaryError` on malformed JSON or invalid templates.
    pub fn from_json_str(json: &str) -> Result<Self, DictionaryError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let mut catalog = Self::new().with_default_price_exponent(file.default_price_exponent);
        for template in file.templates {
            catalog.add_template(template)?;
        }
        Ok(catalog)
    }

    /// Reads a JSON catalog from disk.
    ///
    /// # Errors
    /// Returns `DictionaryError` if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Gets a template by id.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&Template> {
        self.templates.get(&id)
    }

    /// Returns the catalog-wide default price exponent.
    #[must_use]
    pub const fn default_price_exponent(&self) -> u32 {
        self.default_price_exponent
    }

    /// Resolves the exponent for a field of a template.
    ///
    /// Field exponent wins over the template's, which wins over the catalog default.
    #[must_use]
    pub fn exponent_for(&self, template: &Template, field: &FieldDescriptor) -> u32 {
        field
            .exponent
            .or(template.price_exponent)
            .unwrap_or(self.default_price_exponent)
    }

    /// Returns the number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if the catalog has no templates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Returns an iterator over all templates.
    pub fn templates(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "defaultPriceExponent": 4,
        "templates": [
            {
                "id": 64,
                "name": "Heartbeat",
                "fields": [
                    { "id": 34, "name": "MsgSeqNum", "type": "unsignedInt" },
                    { "id": 35, "name": "MsgType", "type": "ascii" },
                    { "id": 52, "name": "SendingTime", "type": "ascii" }
                ]
            },
            {
                "id": 70,
                "name": "Incremental",
                "priceExponent": 2,
                "fields": [
                    { "id": 35, "name": "MsgType", "type": "ascii", "operator": "constant", "constantValue": "X" },
                    { "id": 55, "name": "Symbol", "type": "ascii", "operator": "copy" },
                    { "id": 270, "name": "MDEntryPx", "type": "decimal", "operator": "delta" },
                    { "id": 271, "name": "MDEntrySize", "type": "signedInt", "operator": "delta", "exponent": 0 }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_wire_type_from_str() {
        assert_eq!("ascii".parse::<WireType>().unwrap(), WireType::Ascii);
        assert_eq!("uInt32".parse::<WireType>().unwrap(), WireType::UnsignedInt);
        assert_eq!("decimal".parse::<WireType>().unwrap(), WireType::Decimal);
        assert!("float".parse::<WireType>().is_err());
    }

    #[test]
    fn test_operator_requires_pmap() {
        assert!(!Operator::None.requires_pmap());
        assert!(!Operator::Constant.requires_pmap());
        assert!(Operator::Copy.requires_pmap());
        assert!(Operator::Tail.requires_pmap());
        assert!(Operator::Delta.requires_pmap());
    }

    #[test]
    fn test_catalog_from_json() {
        let catalog = TemplateCatalog::from_json_str(CATALOG).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.default_price_exponent(), 4);

        let heartbeat = catalog.get(64).unwrap();
        assert_eq!(heartbeat.name, "Heartbeat");
        assert_eq!(heartbeat.fields.len(), 3);
        assert_eq!(heartbeat.pmap_bits(), 0);

        let incremental = catalog.get(70).unwrap();
        assert_eq!(incremental.fields[0].operator, Operator::Constant);
        assert_eq!(incremental.fields[0].constant_value.as_deref(), Some("X"));
        assert_eq!(incremental.pmap_bits(), 3);
    }

    #[test]
    fn test_exponent_precedence() {
        let catalog = TemplateCatalog::from_json_str(CATALOG).unwrap();
        let heartbeat = catalog.get(64).unwrap();
        let incremental = catalog.get(70).unwrap();

        assert_eq!(catalog.exponent_for(heartbeat, &heartbeat.fields[0]), 4);
        assert_eq!(catalog.exponent_for(incremental, &incremental.fields[2]), 2);
        assert_eq!(catalog.exponent_for(incremental, &incremental.fields[3]), 0);
    }

    #[test]
    fn test_duplicate_template_rejected() {
        let template = Template::new(1, "A", vec![]);
        let mut catalog = TemplateCatalog::new();
        catalog.add_template(template.clone()).unwrap();
        assert!(matches!(
            catalog.add_template(template),
            Err(DictionaryError::DuplicateTemplate(1))
        ));
    }

    #[test]
    fn test_constant_without_value_rejected() {
        let field = FieldDescriptor::new(35, "MsgType", WireType::Ascii)
            .with_operator(Operator::Constant);
        let result = TemplateCatalog::new().with_template(Template::new(2, "B", vec![field]));
        assert!(matches!(
            result,
            Err(DictionaryError::MissingConstant {
                template_id: 2,
                field_id: 35
            })
        ));
    }

    #[test]
    fn test_delta_on_ascii_rejected() {
        let field =
            FieldDescriptor::new(55, "Symbol", WireType::Ascii).with_operator(Operator::Delta);
        let result = TemplateCatalog::new().with_template(Template::new(3, "C", vec![field]));
        assert!(matches!(result, Err(DictionaryError::InvalidField { .. })));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            TemplateCatalog::from_json_str("{ not json"),
            Err(DictionaryError::Json(_))
        ));
    }
}
