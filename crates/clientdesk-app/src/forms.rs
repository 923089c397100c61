// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};

use crate::NewClient;
use crate::codec::parse_multi_value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateField {
    ClientName,
    Tickers,
    Currencies,
    Region,
}

impl CreateField {
    pub const ALL: [Self; 4] = [
        Self::ClientName,
        Self::Tickers,
        Self::Currencies,
        Self::Region,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::ClientName => "Client name",
            Self::Tickers => "Tickers (comma separated)",
            Self::Currencies => "Currencies (comma separated)",
            Self::Region => "Region",
        }
    }

    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let index = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Raw text of the new-client form. Lists stay unparsed until submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateForm {
    pub client_name: String,
    pub tickers: String,
    pub currencies: String,
    pub region: String,
    pub focus: CreateField,
    pub submitting: bool,
}

impl Default for CreateForm {
    fn default() -> Self {
        Self {
            client_name: String::new(),
            tickers: String::new(),
            currencies: String::new(),
            region: String::new(),
            focus: CreateField::ClientName,
            submitting: false,
        }
    }
}

impl CreateForm {
    pub fn get(&self, field: CreateField) -> &str {
        match field {
            CreateField::ClientName => &self.client_name,
            CreateField::Tickers => &self.tickers,
            CreateField::Currencies => &self.currencies,
            CreateField::Region => &self.region,
        }
    }

    pub fn get_mut(&mut self, field: CreateField) -> &mut String {
        match field {
            CreateField::ClientName => &mut self.client_name,
            CreateField::Tickers => &mut self.tickers,
            CreateField::Currencies => &mut self.currencies,
            CreateField::Region => &mut self.region,
        }
    }

    pub fn validate(&self) -> Result<NewClient> {
        let client_name = self.client_name.trim();
        if client_name.is_empty() {
            bail!("Client name is required.");
        }
        let region = self.region.trim();
        Ok(NewClient {
            client_name: client_name.to_owned(),
            tickers: parse_multi_value(&self.tickers),
            currencies: parse_multi_value(&self.currencies),
            region: (!region.is_empty()).then(|| region.to_owned()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CreateField, CreateForm};
    use anyhow::Result;

    #[test]
    fn blank_name_is_rejected() {
        let form = CreateForm {
            client_name: "   ".to_owned(),
            tickers: "AAPL".to_owned(),
            ..CreateForm::default()
        };
        let error = form.validate().expect_err("blank name should fail");
        assert_eq!(error.to_string(), "Client name is required.");
    }

    #[test]
    fn validate_trims_and_parses_lists() -> Result<()> {
        let form = CreateForm {
            client_name: "  Harbor Point ".to_owned(),
            tickers: "aapl, ,msft".to_owned(),
            currencies: "USD".to_owned(),
            region: "  ".to_owned(),
            ..CreateForm::default()
        };
        let input = form.validate()?;
        assert_eq!(input.client_name, "Harbor Point");
        assert_eq!(input.tickers, vec!["aapl".to_owned(), "msft".to_owned()]);
        assert_eq!(input.currencies, vec!["USD".to_owned()]);
        assert_eq!(input.region, None);
        Ok(())
    }

    #[test]
    fn focus_cycles_through_every_field() {
        let mut focus = CreateField::ClientName;
        for _ in 0..CreateField::ALL.len() {
            focus = focus.next();
        }
        assert_eq!(focus, CreateField::ClientName);
        assert_eq!(CreateField::ClientName.previous(), CreateField::Region);
    }
}
