/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Template-driven payload decoder.
//!
//! A payload is a presence map, a template id, then the template's fields in
//! declaration order. Carry-forward state lives in a [`FieldDictionary`]
//! owned by the caller, one per channel.

use crate::error::FastError;
use crate::operators::{FieldDictionary, FieldValue, apply_delta, apply_tail};
use crate::pmap::PresenceMap;
use crate::scan::FallbackScanner;
use crate::varint::{decode_ascii, decode_signed, decode_unsigned};
use chrono::{DateTime, Utc};
use fastfeed_core::{EntryType, MarketEvent, Symbol, parse_sending_time, tags};
use fastfeed_dictionary::{FieldDescriptor, Operator, Template, TemplateCatalog, WireType};
use rust_decimal::Decimal;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default number of payload bytes inspected by the fallback scan.
pub const DEFAULT_SCAN_LIMIT: usize = 512;

/// Decoder settings.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Bytes of an unknown-template payload inspected for a symbol and time.
    pub scan_limit: usize,
    /// Instrument class suffixes recognised by the fallback scan.
    pub instrument_suffixes: Vec<String>,
}

impl DecoderConfig {
    /// Sets the fallback scan limit.
    #[must_use]
    pub const fn with_scan_limit(mut self, limit: usize) -> Self {
        self.scan_limit = limit;
        self
    }

    /// Sets the instrument class suffixes.
    #[must_use]
    pub fn with_instrument_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instrument_suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            scan_limit: DEFAULT_SCAN_LIMIT,
            instrument_suffixes: vec!["EQ".to_string()],
        }
    }
}

/// Result of decoding one payload.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    /// Template known, every field resolved.
    Decoded(MarketEvent),
    /// Template not in the catalog; the event holds what the scan recovered.
    UnknownTemplate(MarketEvent),
}

impl DecodeOutcome {
    /// Returns the decoded event.
    #[must_use]
    pub fn event(&self) -> &MarketEvent {
        match self {
            Self::Decoded(e) | Self::UnknownTemplate(e) => e,
        }
    }

    /// Consumes the outcome, returning the event.
    #[must_use]
    pub fn into_event(self) -> MarketEvent {
        match self {
            Self::Decoded(e) | Self::UnknownTemplate(e) => e,
        }
    }
}

type Resolved<'t> = SmallVec<[(&'t FieldDescriptor, FieldValue); 16]>;

/// Decodes framed payloads into market events.
#[derive(Debug, Clone)]
pub struct MessageDecoder {
    catalog: Arc<TemplateCatalog>,
    scanner: FallbackScanner,
}

impl MessageDecoder {
    /// Creates a decoder over a template catalog.
    ///
    /// # Errors
    /// Returns `FastError::InvalidPattern` if the scan patterns do not compile.
    pub fn new(catalog: Arc<TemplateCatalog>, config: &DecoderConfig) -> Result<Self, FastError> {
        Ok(Self {
            catalog,
            scanner: FallbackScanner::new(config)?,
        })
    }

    /// Returns the template catalog.
    #[must_use]
    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// Decodes one payload using the wall clock as the fallback time.
    ///
    /// # Errors
    /// Returns `FastError` if the payload is malformed. The dictionary is left
    /// untouched in that case.
    pub fn decode(
        &self,
        payload: &[u8],
        dict: &mut FieldDictionary,
    ) -> Result<DecodeOutcome, FastError> {
        self.decode_at(payload, dict, Utc::now())
    }

    /// Decodes one payload with an explicit fallback time.
    ///
    /// # Errors
    /// Returns `FastError` if the payload is malformed.
    pub fn decode_at(
        &self,
        payload: &[u8],
        dict: &mut FieldDictionary,
        now: DateTime<Utc>,
    ) -> Result<DecodeOutcome, FastError> {
        let mut offset = 0;
        let mut pmap = PresenceMap::decode(payload, &mut offset)?;
        let template_id = u32::try_from(decode_unsigned(payload, &mut offset)?)
            .map_err(|_| FastError::IntegerOverflow)?;

        let Some(template) = self.catalog.get(template_id) else {
            debug!(template_id, len = payload.len(), "unknown template, scanning payload");
            return Ok(DecodeOutcome::UnknownTemplate(
                self.scanner.scan(template_id, payload, now),
            ));
        };

        let values = resolve_fields(template, &mut pmap, payload, &mut offset, dict)?;
        let event = self.build_event(template, &values, now)?;

        for (field, value) in values {
            if field.operator.uses_dictionary() {
                dict.set(field.id, value);
            }
        }
        Ok(DecodeOutcome::Decoded(event))
    }

    fn build_event(
        &self,
        template: &Template,
        values: &[(&FieldDescriptor, FieldValue)],
        now: DateTime<Utc>,
    ) -> Result<MarketEvent, FastError> {
        let mut event = MarketEvent::new(template.id, now);
        let mut md_entry_type = None;
        let mut appl_seq = None;
        let mut msg_seq = None;

        for (field, value) in values {
            match field.id {
                tags::MSG_TYPE => event.message_type_code = Some(value.to_string()),
                tags::SENDING_TIME => {
                    let text = value.to_string();
                    match parse_sending_time(&text) {
                        Some(time) => {
                            event.sending_time = time;
                            event.timestamp_reliable = true;
                        }
                        None => {
                            warn!(template_id = template.id, value = %text, "unparseable sending time, using wall clock");
                        }
                    }
                }
                tags::SYMBOL => {
                    let text = value.to_string();
                    event.symbol = Symbol::new(&text);
                    if event.symbol.is_none() && !text.is_empty() {
                        warn!(template_id = template.id, symbol = %text, "symbol exceeds capacity");
                    }
                }
                tags::MD_ENTRY_PX => {
                    let exponent = self.catalog.exponent_for(template, field);
                    event.price = Some(to_price(field.id, value, exponent)?);
                }
                tags::MD_ENTRY_SIZE => {
                    event.size = Some(value.as_i64().ok_or_else(|| invalid(field.id, value))?);
                }
                tags::MSG_SEQ_NUM => msg_seq = value.as_u64(),
                tags::APPL_SEQ_NUM => appl_seq = value.as_u64(),
                tags::RPT_SEQ => event.instrument_sequence = value.as_u64(),
                tags::MD_ENTRY_TYPE => md_entry_type = Some(value.to_string()),
                _ => {}
            }
        }

        event.sequence_number = appl_seq.or(msg_seq);
        event.entry_type = EntryType::classify(
            event.message_type_code.as_deref(),
            md_entry_type.as_deref(),
        );
        if !values.iter().any(|(f, _)| f.id == tags::SENDING_TIME) {
            debug!(template_id = template.id, "no sending time, using wall clock");
        }
        Ok(event)
    }
}

/// Walks a template's fields, consuming presence bits for operator-bearing
/// fields in declaration order.
///
/// Previous values are read from `dict` but not written; the caller commits
/// the returned values once the whole payload is decoded.
fn resolve_fields<'t>(
    template: &'t Template,
    pmap: &mut PresenceMap,
    payload: &[u8],
    offset: &mut usize,
    dict: &FieldDictionary,
) -> Result<Resolved<'t>, FastError> {
    let mut values = Resolved::new();

    for field in &template.fields {
        let previous = values
            .iter()
            .rev()
            .find(|(f, _)| f.id == field.id && f.operator.uses_dictionary())
            .map(|(_, v)| v)
            .or_else(|| dict.get(field.id));

        let value = match field.operator {
            Operator::None => read_value(field.wire_type, payload, offset)?,
            Operator::Constant => {
                let text = field.constant_value.as_deref().ok_or_else(|| {
                    FastError::InvalidConstant {
                        field_id: field.id,
                        value: String::new(),
                    }
                })?;
                FieldValue::parse_constant(field.id, field.wire_type, text)?
            }
            Operator::Copy => {
                if pmap.next_bit() {
                    read_value(field.wire_type, payload, offset)?
                } else {
                    previous
                        .cloned()
                        .ok_or(FastError::MissingInitialValue { field_id: field.id })?
                }
            }
            Operator::Tail => {
                if pmap.next_bit() {
                    let tail = read_value(field.wire_type, payload, offset)?;
                    apply_tail(previous, tail)
                } else {
                    previous
                        .cloned()
                        .ok_or(FastError::MissingInitialValue { field_id: field.id })?
                }
            }
            Operator::Delta => {
                if !pmap.next_bit() {
                    return Err(FastError::InvalidDeltaAbsence { field_id: field.id });
                }
                let delta = decode_signed(payload, offset)?;
                apply_delta(field.id, field.wire_type, previous, delta)?
            }
        };
        values.push((field, value));
    }

    Ok(values)
}

fn read_value(wire_type: WireType, payload: &[u8], offset: &mut usize) -> Result<FieldValue, FastError> {
    Ok(match wire_type {
        WireType::Ascii => FieldValue::Ascii(decode_ascii(payload, offset)?),
        WireType::UnsignedInt => FieldValue::UInt(decode_unsigned(payload, offset)?),
        WireType::SignedInt => FieldValue::Int(decode_signed(payload, offset)?),
        WireType::Decimal => FieldValue::Decimal(decode_signed(payload, offset)?),
    })
}

fn to_price(field_id: u32, value: &FieldValue, exponent: u32) -> Result<Decimal, FastError> {
    match value {
        FieldValue::Ascii(text) => text
            .trim()
            .parse::<Decimal>()
            .map_err(|e| FastError::InvalidFieldValue {
                field_id,
                reason: e.to_string(),
            }),
        other => {
            let mantissa = other.as_i64().ok_or(FastError::IntegerOverflow)?;
            Decimal::try_new(mantissa, exponent).map_err(|e| FastError::InvalidFieldValue {
                field_id,
                reason: e.to_string(),
            })
        }
    }
}

fn invalid(field_id: u32, value: &FieldValue) -> FastError {
    FastError::InvalidFieldValue {
        field_id,
        reason: format!("not an integer: {value}"),
    }
}
