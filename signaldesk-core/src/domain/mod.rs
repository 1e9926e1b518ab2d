//! Domain types for SignalDesk

pub mod account;
pub mod alert;
pub mod ids;
pub mod indicator;
pub mod instrument;
pub mod position;
pub mod row;
pub mod signal;
pub mod template;
pub mod trader;

pub use account::{AccountSettings, AccountType, BrokerCredentials};
pub use alert::{AlertKind, PnlAlert};
pub use ids::next_id;
pub use indicator::{params_label, Indicator, IndicatorParams, UnknownIndicator};
pub use instrument::{Instrument, InstrumentCategory};
pub use position::{OpenPosition, TradeHistoryItem};
pub use row::{AccuracyHistory, AccuracyResult, SignalRow, TimeframeSignal, ACCURACY_WINDOW};
pub use signal::{ParseSideError, Signal, TradeSide};
pub use template::{Template, TemplateResults};
pub use trader::{
    CopiedTrade, CopyStatus, FollowSettings, FollowSettingsPatch, FollowedTrader, RiskLevel,
    TopTrader,
};
