// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::ids::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientField {
    ClientName,
    Tickers,
    Currencies,
    TenorsMin,
    TenorsMax,
    TenorsSweetspot,
    FrnBuyer,
    CallableBuyer,
    PrivatePlacementBuyer,
    EsgGreen,
    EsgSocial,
    EsgSustainable,
    TargetSpreadOis,
    TargetGSpread,
    TomsCode,
    ClientNotes,
    Region,
}

impl ClientField {
    /// Grid column order.
    pub const ALL: [Self; 17] = [
        Self::ClientName,
        Self::Tickers,
        Self::Currencies,
        Self::TenorsMin,
        Self::TenorsMax,
        Self::TenorsSweetspot,
        Self::FrnBuyer,
        Self::CallableBuyer,
        Self::PrivatePlacementBuyer,
        Self::EsgGreen,
        Self::EsgSocial,
        Self::EsgSustainable,
        Self::TargetSpreadOis,
        Self::TargetGSpread,
        Self::TomsCode,
        Self::ClientNotes,
        Self::Region,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ClientName => "client_name",
            Self::Tickers => "tickers",
            Self::Currencies => "currencies",
            Self::TenorsMin => "tenors_min",
            Self::TenorsMax => "tenors_max",
            Self::TenorsSweetspot => "tenors_sweetspot",
            Self::FrnBuyer => "frn_buyer",
            Self::CallableBuyer => "callable_buyer",
            Self::PrivatePlacementBuyer => "private_placement_buyer",
            Self::EsgGreen => "esg_green",
            Self::EsgSocial => "esg_social",
            Self::EsgSustainable => "esg_sustainable",
            Self::TargetSpreadOis => "target_spread_ois",
            Self::TargetGSpread => "target_g_spread",
            Self::TomsCode => "toms_code",
            Self::ClientNotes => "client_notes",
            Self::Region => "region",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == value)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ClientName => "Client Name",
            Self::Tickers => "Tickers",
            Self::Currencies => "Currencies",
            Self::TenorsMin => "Tenors Min",
            Self::TenorsMax => "Tenors Max",
            Self::TenorsSweetspot => "Tenors SweetSpot",
            Self::FrnBuyer => "FRN Buyer",
            Self::CallableBuyer => "Callable Buyer",
            Self::PrivatePlacementBuyer => "Private Placement Buyer",
            Self::EsgGreen => "ESG Green",
            Self::EsgSocial => "ESG Social",
            Self::EsgSustainable => "ESG Sustainable",
            Self::TargetSpreadOis => "Target Spread OIS",
            Self::TargetGSpread => "Target G-Spread",
            Self::TomsCode => "TOM's Code",
            Self::ClientNotes => "Client Notes",
            Self::Region => "Region",
        }
    }

    pub const fn kind(self) -> FieldKind {
        match self {
            Self::Tickers | Self::Currencies => FieldKind::List,
            Self::FrnBuyer
            | Self::CallableBuyer
            | Self::EsgGreen
            | Self::EsgSocial
            | Self::EsgSustainable => FieldKind::Flag,
            Self::ClientName
            | Self::TenorsMin
            | Self::TenorsMax
            | Self::TenorsSweetspot
            | Self::PrivatePlacementBuyer
            | Self::TargetSpreadOis
            | Self::TargetGSpread
            | Self::TomsCode
            | Self::ClientNotes
            | Self::Region => FieldKind::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    List,
    Flag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(Option<String>),
    List(Vec<String>),
    Flag(bool),
}

impl FieldValue {
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::List(_) => FieldKind::List,
            Self::Flag(_) => FieldKind::Flag,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub client_name: String,
    #[serde(default)]
    pub tickers: Vec<String>,
    #[serde(default)]
    pub currencies: Vec<String>,
    #[serde(default)]
    pub tenors_min: Option<String>,
    #[serde(default)]
    pub tenors_max: Option<String>,
    #[serde(default)]
    pub tenors_sweetspot: Option<String>,
    #[serde(default)]
    pub frn_buyer: bool,
    #[serde(default)]
    pub callable_buyer: bool,
    #[serde(default)]
    pub private_placement_buyer: Option<String>,
    #[serde(default)]
    pub esg_green: bool,
    #[serde(default)]
    pub esg_social: bool,
    #[serde(default)]
    pub esg_sustainable: bool,
    #[serde(default)]
    pub target_spread_ois: Option<String>,
    #[serde(default)]
    pub target_g_spread: Option<String>,
    #[serde(default)]
    pub toms_code: Option<String>,
    #[serde(default)]
    pub client_notes: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

impl Client {
    /// A record with every optional field absent and every flag off.
    pub fn blank(id: impl Into<ClientId>, client_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            client_name: client_name.into(),
            tickers: Vec::new(),
            currencies: Vec::new(),
            tenors_min: None,
            tenors_max: None,
            tenors_sweetspot: None,
            frn_buyer: false,
            callable_buyer: false,
            private_placement_buyer: None,
            esg_green: false,
            esg_social: false,
            esg_sustainable: false,
            target_spread_ois: None,
            target_g_spread: None,
            toms_code: None,
            client_notes: None,
            region: None,
        }
    }

    pub fn value(&self, field: ClientField) -> FieldValue {
        match field {
            ClientField::ClientName => FieldValue::Text(Some(self.client_name.clone())),
            ClientField::Tickers => FieldValue::List(self.tickers.clone()),
            ClientField::Currencies => FieldValue::List(self.currencies.clone()),
            ClientField::FrnBuyer => FieldValue::Flag(self.frn_buyer),
            ClientField::CallableBuyer => FieldValue::Flag(self.callable_buyer),
            ClientField::EsgGreen => FieldValue::Flag(self.esg_green),
            ClientField::EsgSocial => FieldValue::Flag(self.esg_social),
            ClientField::EsgSustainable => FieldValue::Flag(self.esg_sustainable),
            ClientField::TenorsMin => FieldValue::Text(self.tenors_min.clone()),
            ClientField::TenorsMax => FieldValue::Text(self.tenors_max.clone()),
            ClientField::TenorsSweetspot => FieldValue::Text(self.tenors_sweetspot.clone()),
            ClientField::PrivatePlacementBuyer => {
                FieldValue::Text(self.private_placement_buyer.clone())
            }
            ClientField::TargetSpreadOis => FieldValue::Text(self.target_spread_ois.clone()),
            ClientField::TargetGSpread => FieldValue::Text(self.target_g_spread.clone()),
            ClientField::TomsCode => FieldValue::Text(self.toms_code.clone()),
            ClientField::ClientNotes => FieldValue::Text(self.client_notes.clone()),
            ClientField::Region => FieldValue::Text(self.region.clone()),
        }
    }

    /// Writes `value` into `field`. Returns false, leaving the record alone,
    /// when the value kind does not match the field kind.
    pub fn set_value(&mut self, field: ClientField, value: FieldValue) -> bool {
        if field.kind() != value.kind() {
            return false;
        }
        match (field, value) {
            (ClientField::ClientName, FieldValue::Text(text)) => {
                self.client_name = text.unwrap_or_default();
            }
            (ClientField::Tickers, FieldValue::List(tokens)) => self.tickers = tokens,
            (ClientField::Currencies, FieldValue::List(tokens)) => self.currencies = tokens,
            (ClientField::FrnBuyer, FieldValue::Flag(flag)) => self.frn_buyer = flag,
            (ClientField::CallableBuyer, FieldValue::Flag(flag)) => self.callable_buyer = flag,
            (ClientField::EsgGreen, FieldValue::Flag(flag)) => self.esg_green = flag,
            (ClientField::EsgSocial, FieldValue::Flag(flag)) => self.esg_social = flag,
            (ClientField::EsgSustainable, FieldValue::Flag(flag)) => self.esg_sustainable = flag,
            (field, FieldValue::Text(text)) => match self.optional_text_mut(field) {
                Some(slot) => *slot = text,
                None => return false,
            },
            _ => return false,
        }
        true
    }

    pub fn with_value(&self, field: ClientField, value: FieldValue) -> Self {
        let mut next = self.clone();
        next.set_value(field, value);
        next
    }

    /// The storage behind a nullable text field; `None` for every other
    /// field.
    fn optional_text_mut(&mut self, field: ClientField) -> Option<&mut Option<String>> {
        let slot = match field {
            ClientField::TenorsMin => &mut self.tenors_min,
            ClientField::TenorsMax => &mut self.tenors_max,
            ClientField::TenorsSweetspot => &mut self.tenors_sweetspot,
            ClientField::PrivatePlacementBuyer => &mut self.private_placement_buyer,
            ClientField::TargetSpreadOis => &mut self.target_spread_ois,
            ClientField::TargetGSpread => &mut self.target_g_spread,
            ClientField::TomsCode => &mut self.toms_code,
            ClientField::ClientNotes => &mut self.client_notes,
            ClientField::Region => &mut self.region,
            ClientField::ClientName
            | ClientField::Tickers
            | ClientField::Currencies
            | ClientField::FrnBuyer
            | ClientField::CallableBuyer
            | ClientField::EsgGreen
            | ClientField::EsgSocial
            | ClientField::EsgSustainable => return None,
        };
        Some(slot)
    }
}

/// Single-field partial update body. Serializes as a one-key object, for
/// example `{"tickers": ["AAPL"]}` or `{"region": null}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPatch {
    pub field: ClientField,
    pub value: FieldValue,
}

impl Serialize for FieldPatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        let key = self.field.as_str();
        match &self.value {
            FieldValue::Text(text) => map.serialize_entry(key, text)?,
            FieldValue::List(tokens) => map.serialize_entry(key, tokens)?,
            FieldValue::Flag(flag) => map.serialize_entry(key, flag)?,
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    pub client_name: String,
    pub tickers: Vec<String>,
    pub currencies: Vec<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub client_id: ClientId,
    #[serde(default)]
    pub user_id: Option<String>,
    pub field_name: String,
    #[serde(default)]
    pub old_value: Option<String>,
    #[serde(default)]
    pub new_value: Option<String>,
    pub changed_at: String,
}

impl AuditEntry {
    pub fn changed_at_time(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::parse(&self.changed_at, &Rfc3339).ok()
    }

    /// `2026-01-09 14:03` when the timestamp parses, otherwise the raw value.
    pub fn changed_at_label(&self) -> String {
        self.changed_at_time()
            .and_then(|at| {
                at.format(&time::macros::format_description!(
                    "[year]-[month]-[day] [hour]:[minute]"
                ))
                .ok()
            })
            .unwrap_or_else(|| self.changed_at.clone())
    }
}
