//! P&L alert evaluation.

use crate::domain::{AlertKind, OpenPosition, PnlAlert};

/// Enabled alerts whose condition holds right now.
///
/// A symbol-scoped alert looks at that position only and is silent when no
/// such position is open. An unscoped alert checks the book's total PnL and
/// never fires for [`AlertKind::Percent`].
pub fn check_alerts<'a>(
    alerts: &'a [PnlAlert],
    total_pnl: f64,
    positions: &[OpenPosition],
) -> Vec<&'a PnlAlert> {
    alerts
        .iter()
        .filter(|a| a.enabled)
        .filter(|a| match &a.symbol {
            Some(symbol) => positions
                .iter()
                .find(|p| &p.symbol == symbol)
                .is_some_and(|p| match a.kind {
                    AlertKind::Profit => p.pnl >= a.threshold,
                    AlertKind::Loss => p.pnl <= -a.threshold,
                    AlertKind::Percent => p.pnl_percent.abs() >= a.threshold,
                }),
            None => match a.kind {
                AlertKind::Profit => total_pnl >= a.threshold,
                AlertKind::Loss => total_pnl <= -a.threshold,
                AlertKind::Percent => false,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::demo_positions;
    use chrono::Utc;

    fn alert(kind: AlertKind, threshold: f64, symbol: Option<&str>) -> PnlAlert {
        PnlAlert {
            id: format!("{kind:?}-{threshold}"),
            kind,
            threshold,
            enabled: true,
            symbol: symbol.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn scoped_and_unscoped() {
        let book = demo_positions(Utc::now());
        let alerts = vec![
            alert(AlertKind::Profit, 30.0, Some("AAPL")),   // 38 >= 30
            alert(AlertKind::Loss, 200.0, Some("BTC/USD")), // -225 <= -200
            alert(AlertKind::Percent, 2.0, Some("AAPL")),   // 2.13
            alert(AlertKind::Loss, 100.0, None),            // -170 <= -100
            alert(AlertKind::Profit, 1.0, None),
            alert(AlertKind::Percent, 0.1, None),
            alert(AlertKind::Profit, 1.0, Some("TSLA")),
        ];
        let fired: Vec<&str> = check_alerts(&alerts, -170.0, &book)
            .into_iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(fired, vec!["Profit-30", "Loss-200", "Percent-2", "Loss-100"]);
    }

    #[test]
    fn disabled_alerts_never_fire() {
        let mut a = alert(AlertKind::Loss, 1.0, None);
        a.enabled = false;
        assert!(check_alerts(&[a], -1000.0, &[]).is_empty());
    }
}
