//! Derived-field calculator.
//!
//! Pure functions over `Decimal` used by the toner, returned-unit and TCO
//! registries, both when persisting and for the live preview endpoints.
//! A zero divisor always yields zero.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::returned_unit::Destination;

/// Pages a returned cartridge sent to stock is assumed to still print,
/// whatever its measured remaining weight. Probably should be
/// `remaining_pages`; kept as-is so stored values stay comparable.
pub const ASSUMED_RECOVERED_PAGES: Decimal = dec!(10000);

fn round(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// `unit_price / page_yield` rounded to 3 decimals.
pub fn price_per_page(unit_price: Decimal, page_yield: i32) -> Decimal {
    if page_yield == 0 {
        return Decimal::ZERO;
    }
    round(unit_price / Decimal::from(page_yield), 3)
}

/// Toner mass of a full cartridge, rounded to 1 decimal.
pub fn net_weight(gross_weight: Decimal, empty_weight: Decimal) -> Decimal {
    round(gross_weight - empty_weight, 1)
}

pub fn remaining_weight(returned_weight: Decimal, empty_weight: Decimal) -> Decimal {
    returned_weight - empty_weight
}

/// Whole pages the remaining toner can still print, never negative.
pub fn remaining_pages(remaining_weight: Decimal, net_weight: Decimal, page_yield: i32) -> i64 {
    if net_weight.is_zero() || page_yield == 0 {
        return 0;
    }
    let pages = (remaining_weight * Decimal::from(page_yield) / net_weight).floor();
    pages.max(Decimal::ZERO).to_i64().unwrap_or(0)
}

pub fn recovered_value(price_per_page: Decimal, destination: Destination) -> Decimal {
    match destination {
        Destination::Stock => price_per_page * ASSUMED_RECOVERED_PAGES,
        _ => Decimal::ZERO,
    }
}

/// Share of the usable toner still in the cartridge, clamped to 0..=100
/// and rounded to 1 decimal.
pub fn usable_percentage(
    returned_weight: Decimal,
    gross_weight: Decimal,
    empty_weight: Decimal,
) -> Decimal {
    let usable = gross_weight - empty_weight;
    if usable.is_zero() {
        return Decimal::ZERO;
    }
    let pct = (returned_weight - empty_weight) / usable * dec!(100);
    round(pct.clamp(Decimal::ZERO, dec!(100)), 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum DestinationSuggestion {
    /// Test it; stock as new if good, warranty otherwise.
    StockAsNew,
    /// Test it; stock as semi-new if good, warranty otherwise.
    StockAsSemiNew,
    /// Test it; internal use if good, discard otherwise.
    InternalUse,
    Discard,
}

impl DestinationSuggestion {
    pub fn for_percentage(pct: Decimal) -> Self {
        if pct >= dec!(80) {
            Self::StockAsNew
        } else if pct >= dec!(40) {
            Self::StockAsSemiNew
        } else if pct >= dec!(20) {
            Self::InternalUse
        } else {
            Self::Discard
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            Self::StockAsNew => "Test the product. If it is in good condition, send it to stock as new; otherwise send it to warranty.",
            Self::StockAsSemiNew => "Test the product. If it is in good condition, send it to stock as semi-new; otherwise send it to warranty.",
            Self::InternalUse => "Test the product. If it is in good condition, send it to internal use; otherwise discard it.",
            Self::Discard => "Discard this item.",
        }
    }
}

/// Derived toner columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct TonerFigures {
    pub price_per_page: Decimal,
    pub net_weight: Decimal,
}

pub fn toner_figures(
    unit_price: Decimal,
    page_yield: i32,
    gross_weight: Decimal,
    empty_weight: Decimal,
) -> TonerFigures {
    TonerFigures {
        price_per_page: price_per_page(unit_price, page_yield),
        net_weight: net_weight(gross_weight, empty_weight),
    }
}

/// The toner data a returned-unit calculation depends on.
#[derive(Debug, Clone, Copy)]
pub struct TonerProfile {
    pub gross_weight: Decimal,
    pub empty_weight: Decimal,
    pub net_weight: Decimal,
    pub page_yield: i32,
    pub price_per_page: Decimal,
}

impl From<&crate::entities::toner::Model> for TonerProfile {
    fn from(toner: &crate::entities::toner::Model) -> Self {
        Self {
            gross_weight: toner.gross_weight,
            empty_weight: toner.empty_weight,
            net_weight: toner.net_weight,
            page_yield: toner.page_yield,
            price_per_page: toner.price_per_page,
        }
    }
}

/// Derived returned-unit columns plus the destination advice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct ReturnFigures {
    pub remaining_weight: Decimal,
    pub remaining_pages: i64,
    pub usable_percentage: Decimal,
    pub recovered_value: Decimal,
    pub suggestion: DestinationSuggestion,
    /// Operator-facing text for `suggestion`.
    pub advice: &'static str,
}

pub fn return_figures(
    toner: &TonerProfile,
    returned_weight: Decimal,
    destination: Destination,
) -> ReturnFigures {
    let remaining = remaining_weight(returned_weight, toner.empty_weight);
    let usable = usable_percentage(returned_weight, toner.gross_weight, toner.empty_weight);
    let suggestion = DestinationSuggestion::for_percentage(usable);
    ReturnFigures {
        remaining_weight: remaining,
        remaining_pages: remaining_pages(remaining, toner.net_weight, toner.page_yield),
        usable_percentage: usable,
        recovered_value: recovered_value(toner.price_per_page, destination),
        suggestion,
        advice: suggestion.advice(),
    }
}

/// The six operands of a TCO acquisition total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, ToSchema)]
pub struct AcquisitionCosts {
    pub device_price: Decimal,
    #[serde(default)]
    pub pis: Decimal,
    #[serde(default)]
    pub ipi: Decimal,
    #[serde(default)]
    pub icms: Decimal,
    #[serde(default)]
    pub cofins: Decimal,
    #[serde(default)]
    pub accessories: Decimal,
}

pub fn tco_acquisition_total(costs: &AcquisitionCosts) -> Decimal {
    costs.device_price + costs.pis + costs.ipi + costs.icms + costs.cofins + costs.accessories
}

/// A labelled cost line of a TCO record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CostRow {
    pub label: String,
    pub value: Decimal,
}

/// Running total over every row, including ones that will not be saved.
pub fn itemized_total(rows: &[CostRow]) -> Decimal {
    rows.iter().map(|row| row.value).sum()
}

/// Rows worth saving: non-blank label and non-zero value.
pub fn persistable_rows(rows: &[CostRow]) -> Vec<CostRow> {
    rows.iter()
        .filter(|row| !row.label.trim().is_empty() && !row.value.is_zero())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn profile() -> TonerProfile {
        TonerProfile {
            gross_weight: dec!(700),
            empty_weight: dec!(500),
            net_weight: dec!(200),
            page_yield: 10_000,
            price_per_page: dec!(0.05),
        }
    }

    #[test]
    fn price_per_page_rounds_to_three_places() {
        assert_eq!(price_per_page(dec!(250), 10_000), dec!(0.025));
        assert_eq!(price_per_page(dec!(100), 3), dec!(33.333));
        assert_eq!(price_per_page(dec!(0.0125), 5), dec!(0.003));
    }

    #[test]
    fn price_per_page_with_zero_yield_is_zero() {
        assert_eq!(price_per_page(dec!(250), 0), Decimal::ZERO);
    }

    #[test]
    fn net_weight_rounds_half_away_from_zero() {
        assert_eq!(net_weight(dec!(700.25), dec!(500.2)), dec!(200.1));
        assert_eq!(net_weight(dec!(700.05), dec!(500)), dec!(200.1));
    }

    #[test]
    fn recovered_value_only_for_stock() {
        assert_eq!(recovered_value(dec!(0.05), Destination::Stock), dec!(500));
        for destination in [
            Destination::Discard,
            Destination::Warranty,
            Destination::InternalUse,
        ] {
            assert_eq!(recovered_value(dec!(0.05), destination), Decimal::ZERO);
        }
    }

    #[test]
    fn return_figures_for_half_full_cartridge() {
        let figures = return_figures(&profile(), dec!(600), Destination::Stock);
        assert_eq!(figures.remaining_weight, dec!(100));
        assert_eq!(figures.remaining_pages, 5_000);
        assert_eq!(figures.usable_percentage, dec!(50.0));
        assert_eq!(figures.recovered_value, dec!(500));
        assert_eq!(figures.suggestion, DestinationSuggestion::StockAsSemiNew);
    }

    #[test]
    fn full_cartridge_keeps_full_yield() {
        let figures = return_figures(&profile(), dec!(700), Destination::Stock);
        assert_eq!(figures.remaining_pages, 10_000);
    }

    #[test]
    fn lighter_than_empty_cartridge_clamps_to_zero() {
        let figures = return_figures(&profile(), dec!(450), Destination::Discard);
        assert_eq!(figures.remaining_weight, dec!(-50));
        assert_eq!(figures.remaining_pages, 0);
        assert_eq!(figures.usable_percentage, Decimal::ZERO);
        assert_eq!(figures.suggestion, DestinationSuggestion::Discard);
        assert_eq!(figures.advice, "Discard this item.");
    }

    #[test]
    fn zero_divisors_yield_zero() {
        assert_eq!(remaining_pages(dec!(100), Decimal::ZERO, 1000), 0);
        assert_eq!(remaining_pages(dec!(100), dec!(200), 0), 0);
        assert_eq!(usable_percentage(dec!(600), dec!(500), dec!(500)), Decimal::ZERO);
    }

    #[rstest]
    #[case(dec!(100), DestinationSuggestion::StockAsNew)]
    #[case(dec!(80), DestinationSuggestion::StockAsNew)]
    #[case(dec!(79.9), DestinationSuggestion::StockAsSemiNew)]
    #[case(dec!(40), DestinationSuggestion::StockAsSemiNew)]
    #[case(dec!(39.9), DestinationSuggestion::InternalUse)]
    #[case(dec!(20), DestinationSuggestion::InternalUse)]
    #[case(dec!(19.9), DestinationSuggestion::Discard)]
    #[case(Decimal::ZERO, DestinationSuggestion::Discard)]
    fn suggestion_bands(#[case] pct: Decimal, #[case] expected: DestinationSuggestion) {
        assert_eq!(DestinationSuggestion::for_percentage(pct), expected);
    }

    #[test]
    fn tco_total_sums_all_operands() {
        let costs = AcquisitionCosts {
            device_price: dec!(1000),
            pis: dec!(10),
            ipi: dec!(20),
            icms: dec!(30),
            cofins: dec!(15),
            accessories: dec!(5),
        };
        assert_eq!(tco_acquisition_total(&costs), dec!(1080));
    }

    #[test]
    fn live_total_and_persisted_rows_can_differ() {
        let rows = vec![
            CostRow {
                label: "Paper".into(),
                value: dec!(120),
            },
            CostRow {
                label: "  ".into(),
                value: dec!(30),
            },
            CostRow {
                label: "Maintenance".into(),
                value: Decimal::ZERO,
            },
        ];
        assert_eq!(itemized_total(&rows), dec!(150));
        let kept = persistable_rows(&rows);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].label, "Paper");
    }

    proptest! {
        #[test]
        fn net_weight_matches_rounded_difference(empty in 0i64..100_000, extra in 0i64..100_000) {
            let empty = Decimal::new(empty, 2);
            let gross = empty + Decimal::new(extra, 2);
            let net = net_weight(gross, empty);
            prop_assert_eq!(net, round(gross - empty, 1));
            prop_assert!(net >= Decimal::ZERO);
            prop_assert!(net.scale() <= 1);
        }

        #[test]
        fn price_per_page_never_panics(price in 0i64..10_000_000, pages in 0i32..1_000_000) {
            let ppp = price_per_page(Decimal::new(price, 2), pages);
            prop_assert!(ppp >= Decimal::ZERO);
            prop_assert!(ppp.scale() <= 3);
        }

        #[test]
        fn usable_percentage_stays_in_range(returned in 0i64..200_000, empty in 0i64..50_000, net in 0i64..100_000) {
            let empty = Decimal::new(empty, 1);
            let gross = empty + Decimal::new(net, 1);
            let pct = usable_percentage(Decimal::new(returned, 1), gross, empty);
            prop_assert!(pct >= Decimal::ZERO && pct <= dec!(100));
        }
    }
}
