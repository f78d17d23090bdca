//! Plain-text and JSON rendering of health results

use std::fmt;

use super::{BreakdownLine, HealthRatio, MultiProtocolReport, ProtocolEntry, ProtocolHealthResult};

impl fmt::Display for HealthRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthRatio::Finite(v) => write!(f, "{:.2}", v),
            HealthRatio::Infinite => write!(f, "∞"),
        }
    }
}

impl fmt::Display for BreakdownLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakdownLine::Collateral {
                symbol,
                amount,
                usd,
                collateral_factor,
                weighted_usd,
            } => write!(
                f,
                "🟢 {} supplied: {:.4} (${:.2} × CF {:.0}% = ${:.4})",
                symbol,
                amount,
                usd,
                collateral_factor * 100.0,
                weighted_usd
            ),
            BreakdownLine::Borrow { symbol, amount, usd } => {
                write!(f, "🔴 {} borrowed: {:.4} (${:.4})", symbol, amount, usd)
            }
            BreakdownLine::Unavailable { symbol, reason } => {
                write!(f, "⚠️ {}: data unavailable ({})", symbol, reason)
            }
        }
    }
}

impl ProtocolHealthResult {
    pub fn to_text(&self) -> String {
        let mut lines = vec![
            format!("📊 {}", self.protocol_name),
            format!("Health ratio: {}", self.health_ratio),
            format!("Collateral (weighted): ${:.2}", self.total_collateral_usd),
            format!("Borrowed: ${:.2}", self.total_borrow_usd),
            format!("Portfolio: ${:.2}", self.portfolio_usd),
        ];
        lines.extend(self.breakdown.iter().map(|line| format!("  {}", line)));

        match self.liquidation_reference_price {
            Some(price) => lines.push(format!(
                "⚡ {} liquidation price ≈ ${:.2} (approximation, other assets held fixed)",
                self.reference_asset, price
            )),
            None => lines.push(format!("✅ Safe: no {} borrowed", self.reference_asset)),
        }
        lines.join("\n")
    }
}

impl MultiProtocolReport {
    pub fn to_text(&self) -> String {
        if self.entries.is_empty() {
            return "🩺 No lending protocols configured".to_string();
        }

        let mut blocks = vec![format!(
            "🩺 Health report ({} UTC)",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        )];
        for entry in &self.entries {
            match entry {
                ProtocolEntry::Evaluated(result) => blocks.push(result.to_text()),
                ProtocolEntry::Failed(failure) => blocks.push(format!(
                    "❌ {}: evaluation failed ({})",
                    failure.protocol_name, failure.reason
                )),
            }
        }
        blocks.join("\n\n")
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::health::{HealthEvaluator, MarketValuation, ProtocolFailure};
    use crate::shared::types::PortfolioBasis;
    use chrono::Utc;

    fn valued(symbol: &str, supplied: f64, borrowed: f64, price: f64, cf: f64) -> Result<MarketValuation, BreakdownLine> {
        Ok(MarketValuation {
            symbol: symbol.to_string(),
            supplied_underlying: supplied,
            borrowed_underlying: borrowed,
            supplied_usd: supplied * price,
            borrowed_usd: borrowed * price,
            collateral_factor: cf,
        })
    }

    fn dollar_amount(text: &str) -> f64 {
        text.trim_start_matches('$')
            .trim_end_matches(')')
            .parse()
            .unwrap()
    }

    /// Re-derive (collateral, borrow) totals from the rendered breakdown
    fn totals_from_text(text: &str) -> (f64, f64) {
        let mut collateral = 0.0;
        let mut borrow = 0.0;
        for line in text.lines().map(str::trim) {
            if line.starts_with("🟢") {
                let weighted = line.rsplit("= ").next().unwrap();
                collateral += dollar_amount(weighted);
            } else if line.starts_with("🔴") {
                let usd = line.rsplit('(').next().unwrap();
                borrow += dollar_amount(usd);
            }
        }
        (collateral, borrow)
    }

    #[test]
    fn test_text_round_trip_reproduces_totals() {
        let evaluator = HealthEvaluator::new("ETH");
        let result = evaluator.aggregate(
            "Compound",
            PortfolioBasis::Supplied,
            &[
                valued("ETH", 1.25, 0.4, 2412.37, 0.825),
                valued("USDC", 3150.5, 0.0, 1.0, 0.855),
                valued("DAI", 0.0, 1200.75, 1.0, 0.8),
            ],
        );

        let (collateral, borrow) = totals_from_text(&result.to_text());
        assert!((collateral - result.total_collateral_usd).abs() <= 1e-2, "{} vs {}", collateral, result.total_collateral_usd);
        assert!((borrow - result.total_borrow_usd).abs() <= 1e-2, "{} vs {}", borrow, result.total_borrow_usd);
    }

    #[test]
    fn test_text_round_trip_many_lines_stays_within_a_cent() {
        let evaluator = HealthEvaluator::new("ETH");
        let stables = ["USDC", "DAI", "USDT", "TUSD", "USDP", "FRAX", "LUSD", "GUSD"];
        let mut markets: Vec<_> = stables
            .iter()
            .map(|s| valued(s, 1000.006, 0.0, 1.0, 1.0))
            .collect();
        markets.extend(stables.iter().map(|s| valued(s, 0.0, 333.336, 1.0, 0.8)));

        let result = evaluator.aggregate("Compound", PortfolioBasis::Supplied, &markets);
        let (collateral, borrow) = totals_from_text(&result.to_text());

        assert!((result.total_collateral_usd - 8000.048).abs() < 1e-9);
        assert!((collateral - result.total_collateral_usd).abs() <= 1e-2, "{} vs {}", collateral, result.total_collateral_usd);
        assert!((borrow - result.total_borrow_usd).abs() <= 1e-2, "{} vs {}", borrow, result.total_borrow_usd);
    }

    #[test]
    fn test_breakdown_line_format() {
        let collateral = BreakdownLine::Collateral {
            symbol: "USDC".to_string(),
            amount: 1000.006,
            usd: 1000.006,
            collateral_factor: 0.8,
            weighted_usd: 800.0048,
        };
        assert_eq!(
            collateral.to_string(),
            "🟢 USDC supplied: 1000.0060 ($1000.01 × CF 80% = $800.0048)"
        );

        let borrow = BreakdownLine::Borrow {
            symbol: "DAI".to_string(),
            amount: 333.336,
            usd: 333.336,
        };
        assert_eq!(borrow.to_string(), "🔴 DAI borrowed: 333.3360 ($333.3360)");
    }

    #[test]
    fn test_text_shows_liquidation_price_or_safe() {
        let evaluator = HealthEvaluator::new("ETH");

        let borrowing = evaluator.aggregate("P", PortfolioBasis::Supplied, &[valued("ETH", 0.0, 2.0, 2000.0, 0.8), valued("USDC", 5000.0, 0.0, 1.0, 0.8)]);
        let text = borrowing.to_text();
        assert!(text.contains("ETH liquidation price ≈ $2000.00"));
        assert!(text.contains("Health ratio: 1.00"));

        let safe = evaluator.aggregate("P", PortfolioBasis::Supplied, &[valued("USDC", 5000.0, 0.0, 1.0, 0.8)]);
        let text = safe.to_text();
        assert!(text.contains("✅ Safe: no ETH borrowed"));
        assert!(text.contains("Health ratio: ∞"));
    }

    #[test]
    fn test_report_lists_failures_explicitly() {
        let evaluator = HealthEvaluator::new("ETH");
        let report = MultiProtocolReport {
            entries: vec![
                ProtocolEntry::Evaluated(evaluator.aggregate("Compound", PortfolioBasis::Supplied, &[])),
                ProtocolEntry::Failed(ProtocolFailure {
                    protocol_name: "Venus".to_string(),
                    reason: "USD conversion aborted".to_string(),
                }),
            ],
            generated_at: Utc::now(),
        };

        let text = report.to_text();
        assert!(text.contains("📊 Compound"));
        assert!(text.contains("❌ Venus: evaluation failed (USD conversion aborted)"));
        assert!(text.find("Compound").unwrap() < text.find("Venus").unwrap());

        let json = report.to_json().unwrap();
        assert!(json.contains("\"protocol_name\": \"Venus\""));
    }

    #[test]
    fn test_unavailable_line_format() {
        let line = BreakdownLine::Unavailable {
            symbol: "DAI".to_string(),
            reason: "RPC request failed: timeout".to_string(),
        };
        assert_eq!(line.to_string(), "⚠️ DAI: data unavailable (RPC request failed: timeout)");
    }
}
