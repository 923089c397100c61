// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::codec::{merge_suggestion_into_multi_value, trailing_token};
use crate::{ClientField, RecordStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criterion {
    Text,
    Ticker,
    Currency,
}

impl Criterion {
    pub const ALL: [Self; 3] = [Self::Text, Self::Ticker, Self::Currency];

    pub const fn param_name(self) -> &'static str {
        match self {
            Self::Text => "q",
            Self::Ticker => "ticker",
            Self::Currency => "currency",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Ticker => "Ticker",
            Self::Currency => "Currency",
        }
    }

    /// The record field whose tokens feed this criterion's suggestion list.
    pub const fn suggestion_field(self) -> Option<ClientField> {
        match self {
            Self::Text => None,
            Self::Ticker => Some(ClientField::Tickers),
            Self::Currency => Some(ClientField::Currencies),
        }
    }
}

/// Session-local search criteria. Each value is sent to the backend as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub query: String,
    pub ticker: String,
    pub currency: String,
}

impl Filter {
    pub fn get(&self, criterion: Criterion) -> &str {
        match criterion {
            Criterion::Text => &self.query,
            Criterion::Ticker => &self.ticker,
            Criterion::Currency => &self.currency,
        }
    }

    pub fn set(&mut self, criterion: Criterion, value: impl Into<String>) {
        let slot = match criterion {
            Criterion::Text => &mut self.query,
            Criterion::Ticker => &mut self.ticker,
            Criterion::Currency => &mut self.currency,
        };
        *slot = value.into();
    }

    pub fn is_empty(&self) -> bool {
        Criterion::ALL
            .into_iter()
            .all(|criterion| self.get(criterion).is_empty())
    }
}

/// One `(name, value)` pair per non-empty criterion. Empty criteria are left
/// out instead of being sent blank.
pub fn build_query_params(filter: &Filter) -> Vec<(&'static str, String)> {
    Criterion::ALL
        .into_iter()
        .filter(|criterion| !filter.get(*criterion).is_empty())
        .map(|criterion| (criterion.param_name(), filter.get(criterion).to_owned()))
        .collect()
}

pub fn clear_criterion(filter: &Filter, criterion: Criterion) -> Filter {
    let mut next = filter.clone();
    next.set(criterion, String::new());
    next
}

pub fn apply_suggestion(current: &str, token: &str) -> String {
    merge_suggestion_into_multi_value(current, token)
}

/// Labels for the active-filter chip bar, for example `Ticker: AAPL, NVDA`.
pub fn chips(filter: &Filter) -> Vec<(Criterion, String)> {
    Criterion::ALL
        .into_iter()
        .filter(|criterion| !filter.get(*criterion).is_empty())
        .map(|criterion| {
            (
                criterion,
                format!("{}: {}", criterion.label(), filter.get(criterion)),
            )
        })
        .collect()
}

/// Known tokens for a criterion, narrowed to those starting with the token
/// currently being typed (case-insensitive).
pub fn suggestions(store: &RecordStore, criterion: Criterion, current: &str) -> Vec<String> {
    let Some(field) = criterion.suggestion_field() else {
        return Vec::new();
    };
    let prefix = trailing_token(current).to_lowercase();
    store
        .unique_tokens(field)
        .into_iter()
        .filter(|token| token.to_lowercase().starts_with(&prefix))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        Criterion, Filter, apply_suggestion, build_query_params, chips, clear_criterion,
        suggestions,
    };
    use crate::{Client, RecordStore};

    #[test]
    fn empty_filter_yields_no_params() {
        assert!(build_query_params(&Filter::default()).is_empty());
    }

    #[test]
    fn only_non_empty_criteria_become_params() {
        let filter = Filter {
            query: "RBIB".to_owned(),
            ticker: String::new(),
            currency: "USD".to_owned(),
        };
        assert_eq!(
            build_query_params(&filter),
            vec![("q", "RBIB".to_owned()), ("currency", "USD".to_owned())]
        );
    }

    #[test]
    fn multi_token_criteria_pass_through_untouched() {
        let filter = Filter {
            ticker: "AAPL, aapl,NVDA".to_owned(),
            ..Filter::default()
        };
        assert_eq!(
            build_query_params(&filter),
            vec![("ticker", "AAPL, aapl,NVDA".to_owned())]
        );
    }

    #[test]
    fn clear_criterion_blanks_exactly_one_field() {
        let filter = Filter {
            query: "north".to_owned(),
            ticker: "AAPL".to_owned(),
            currency: "EUR".to_owned(),
        };
        let cleared = clear_criterion(&filter, Criterion::Ticker);
        assert_eq!(
            cleared,
            Filter {
                query: "north".to_owned(),
                ticker: String::new(),
                currency: "EUR".to_owned(),
            }
        );
        assert_eq!(filter.ticker, "AAPL");
    }

    #[test]
    fn apply_suggestion_composes_tokens_for_any_list_criterion() {
        let mut filter = Filter::default();
        filter.set(Criterion::Ticker, apply_suggestion("AA", "AAPL"));
        filter.set(
            Criterion::Ticker,
            apply_suggestion(&format!("{},", filter.ticker), "NVDA"),
        );
        filter.set(Criterion::Currency, apply_suggestion("EUR, u", "USD"));
        assert_eq!(filter.ticker, "AAPL, NVDA");
        assert_eq!(filter.currency, "EUR, USD");
    }

    #[test]
    fn chips_follow_criterion_order() {
        let filter = Filter {
            query: String::new(),
            ticker: "AAPL".to_owned(),
            currency: "USD".to_owned(),
        };
        let labels = chips(&filter)
            .into_iter()
            .map(|(_, label)| label)
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["Ticker: AAPL", "Currency: USD"]);
        assert!(chips(&Filter::default()).is_empty());
        assert!(Filter::default().is_empty());
    }

    #[test]
    fn suggestions_narrow_on_trailing_partial_token() {
        let mut store = RecordStore::new();
        store.replace_all(vec![
            Client {
                tickers: vec!["AAPL".to_owned(), "NVDA".to_owned()],
                currencies: vec!["USD".to_owned()],
                ..Client::blank("1", "Acme")
            },
            Client {
                tickers: vec!["AMZN".to_owned()],
                currencies: vec!["EUR".to_owned()],
                ..Client::blank("2", "Blue Harbor")
            },
        ]);

        assert_eq!(
            suggestions(&store, Criterion::Ticker, ""),
            vec!["AAPL".to_owned(), "AMZN".to_owned(), "NVDA".to_owned()]
        );
        assert_eq!(
            suggestions(&store, Criterion::Ticker, "NVDA, a"),
            vec!["AAPL".to_owned(), "AMZN".to_owned()]
        );
        assert_eq!(
            suggestions(&store, Criterion::Currency, "e"),
            vec!["EUR".to_owned()]
        );
        assert!(suggestions(&store, Criterion::Text, "").is_empty());
    }
}
