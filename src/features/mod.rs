//! Feature engineering for volatility prediction
//!
//! Turns a validated OHLCV frame into a [`FeatureFrame`] and the ordered
//! [`FeatureSpec`] that training and serving share.

mod config;
mod feature_frame;
mod indicators;
mod spec;
mod target;
mod transformer;

pub use config::FeatureConfig;
pub use feature_frame::FeatureFrame;
pub use indicators::{momentum, rsi, volume_ratio, Macd};
pub use spec::{FeatureSpec, MissingFeaturePolicy};
pub use target::{is_target_column, Targets, FUTURE_RETURNS, TARGET_REALIZED_VOL, TARGET_VOLATILITY};
pub use transformer::FeatureTransformer;
