//! Function catalog exposed to the agent
//!
//! [`IndicatorKind`] names every function the agent may call. The catalog sent
//! with the first agent call is derived from it, and [`IndicatorCall::decode`]
//! turns a raw [`FunctionCall`] back into a typed, validated invocation.

use crate::error::{Result, SageError};
use sage_llm::functions::schema;
use sage_llm::{FunctionCall, FunctionSpec};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value, json};
use std::fmt;
use std::str::FromStr;

/// Functions the agent can call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Price,
    Sma,
    Ema,
    Rsi,
    Macd,
    Plot,
}

impl IndicatorKind {
    /// Every kind, in catalog order
    pub const ALL: [IndicatorKind; 6] = [
        Self::Price,
        Self::Sma,
        Self::Ema,
        Self::Rsi,
        Self::Macd,
        Self::Plot,
    ];

    /// Name the agent uses to call this function
    pub fn name(self) -> &'static str {
        match self {
            Self::Price => "getStockPrice",
            Self::Sma => "calculateSMA",
            Self::Ema => "calculateEMA",
            Self::Rsi => "calculateRSI",
            Self::Macd => "calculateMACD",
            Self::Plot => "plotStockPrice",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Price => "Gets the latest stock price given the ticker symbol of a company.",
            Self::Sma => {
                "Calculate the simple moving average for a given stock ticker and a window."
            }
            Self::Ema => {
                "Calculate the exponential moving average for a given stock ticker and a window."
            }
            Self::Rsi => "Calculate the RSI for a given stock ticker.",
            Self::Macd => "Calculate the MACD for a given stock ticker.",
            Self::Plot => {
                "Plot the stock price for the last year given the ticker symbol of a company"
            }
        }
    }

    /// JSON schema of the function's arguments
    pub fn parameters(self) -> Value {
        match self {
            Self::Price => schema::object(
                json!({
                    "ticker": schema::string(
                        "The stock ticker symbol for a company (for example AAPL for Apple)."
                    ),
                }),
                vec!["ticker"],
            ),
            Self::Sma | Self::Ema => schema::object(
                json!({
                    "ticker": schema::property("string", None),
                    "window": schema::property("integer", None),
                }),
                vec!["ticker", "window"],
            ),
            Self::Rsi | Self::Macd | Self::Plot => schema::object(
                json!({
                    "ticker": schema::property("string", None),
                }),
                vec!["ticker"],
            ),
        }
    }

    /// Catalog entry for this function
    pub fn spec(self) -> FunctionSpec {
        FunctionSpec::new(self.name(), self.description(), self.parameters())
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IndicatorKind {
    type Err = SageError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| SageError::UnknownFunction(s.to_string()))
    }
}

/// The full catalog, fixed for the life of the process
pub fn catalog() -> Vec<FunctionSpec> {
    IndicatorKind::ALL.into_iter().map(IndicatorKind::spec).collect()
}

#[derive(Debug, Deserialize)]
struct TickerArgs {
    ticker: String,
}

#[derive(Debug, Deserialize)]
struct WindowArgs {
    ticker: String,
    window: Number,
}

/// A decoded, validated function call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndicatorCall {
    Price { ticker: String },
    Sma { ticker: String, window: usize },
    Ema { ticker: String, window: usize },
    Rsi { ticker: String },
    Macd { ticker: String },
    Plot { ticker: String },
}

impl IndicatorCall {
    /// Decode the agent's function-call request
    ///
    /// Unknown names fail closed. The argument object is narrowed to the keys
    /// the function's schema lists as required before it is decoded.
    pub fn decode(call: &FunctionCall) -> Result<Self> {
        let kind: IndicatorKind = call.name.parse()?;
        let raw = call
            .arguments_value()
            .map_err(|e| SageError::invalid_arguments(kind.name(), e.to_string()))?;
        let args = whitelist(kind, raw)?;

        Ok(match kind {
            IndicatorKind::Price => Self::Price {
                ticker: ticker_args(kind, args)?,
            },
            IndicatorKind::Sma => {
                let (ticker, window) = window_args(kind, args)?;
                Self::Sma { ticker, window }
            }
            IndicatorKind::Ema => {
                let (ticker, window) = window_args(kind, args)?;
                Self::Ema { ticker, window }
            }
            IndicatorKind::Rsi => Self::Rsi {
                ticker: ticker_args(kind, args)?,
            },
            IndicatorKind::Macd => Self::Macd {
                ticker: ticker_args(kind, args)?,
            },
            IndicatorKind::Plot => Self::Plot {
                ticker: ticker_args(kind, args)?,
            },
        })
    }

    pub fn kind(&self) -> IndicatorKind {
        match self {
            Self::Price { .. } => IndicatorKind::Price,
            Self::Sma { .. } => IndicatorKind::Sma,
            Self::Ema { .. } => IndicatorKind::Ema,
            Self::Rsi { .. } => IndicatorKind::Rsi,
            Self::Macd { .. } => IndicatorKind::Macd,
            Self::Plot { .. } => IndicatorKind::Plot,
        }
    }

    pub fn ticker(&self) -> &str {
        match self {
            Self::Price { ticker }
            | Self::Sma { ticker, .. }
            | Self::Ema { ticker, .. }
            | Self::Rsi { ticker }
            | Self::Macd { ticker }
            | Self::Plot { ticker } => ticker,
        }
    }
}

/// Keep only the keys the function declares as required
fn whitelist(kind: IndicatorKind, raw: Value) -> Result<Value> {
    let Value::Object(mut object) = raw else {
        return Err(SageError::invalid_arguments(
            kind.name(),
            "arguments must be a JSON object",
        ));
    };

    let spec = kind.spec();
    let mut kept = Map::new();
    for key in spec.required() {
        let value = object
            .remove(key)
            .ok_or_else(|| SageError::invalid_arguments(kind.name(), format!("missing `{key}`")))?;
        kept.insert(key.to_string(), value);
    }
    Ok(Value::Object(kept))
}

fn parse_args<T: DeserializeOwned>(kind: IndicatorKind, args: Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| SageError::invalid_arguments(kind.name(), e.to_string()))
}

fn ticker_args(kind: IndicatorKind, args: Value) -> Result<String> {
    let TickerArgs { ticker } = parse_args(kind, args)?;
    normalize_ticker(kind, &ticker)
}

fn window_args(kind: IndicatorKind, args: Value) -> Result<(String, usize)> {
    let WindowArgs { ticker, window } = parse_args(kind, args)?;
    let ticker = normalize_ticker(kind, &ticker)?;
    let window = window_value(&window).ok_or_else(|| {
        SageError::invalid_arguments(
            kind.name(),
            format!("window must be a whole number, got {window}"),
        )
    })?;
    if window == 0 {
        return Err(SageError::invalid_arguments(
            kind.name(),
            "window must be at least 1",
        ));
    }
    Ok((ticker, window))
}

/// Non-negative integer, also accepting integral floats such as `20.0`
fn window_value(number: &Number) -> Option<usize> {
    if let Some(window) = number.as_u64() {
        return usize::try_from(window).ok();
    }
    let window = number.as_f64().filter(|w| w.fract() == 0.0 && *w >= 0.0)?;
    usize::try_from(window as u64).ok()
}

fn normalize_ticker(kind: IndicatorKind, ticker: &str) -> Result<String> {
    let ticker = ticker.trim();
    if ticker.is_empty() {
        return Err(SageError::invalid_arguments(kind.name(), "ticker is empty"));
    }
    Ok(ticker.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, arguments: Value) -> FunctionCall {
        FunctionCall::new(name, arguments.to_string())
    }

    #[test]
    fn test_catalog_names_round_trip() {
        let specs = catalog();
        assert_eq!(specs.len(), 6);
        for (spec, kind) in specs.iter().zip(IndicatorKind::ALL) {
            assert_eq!(spec.name.parse::<IndicatorKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_catalog_wire_shape() {
        let specs = serde_json::to_value(catalog()).unwrap();

        assert_eq!(
            specs[0],
            json!({
                "name": "getStockPrice",
                "description": "Gets the latest stock price given the ticker symbol of a company.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "ticker": {
                            "type": "string",
                            "description": "The stock ticker symbol for a company (for example AAPL for Apple)."
                        }
                    },
                    "required": ["ticker"]
                }
            })
        );
        assert_eq!(
            specs[1]["parameters"],
            json!({
                "type": "object",
                "properties": {
                    "ticker": {"type": "string"},
                    "window": {"type": "integer"}
                },
                "required": ["ticker", "window"]
            })
        );
        assert_eq!(specs[5]["name"], "plotStockPrice");
    }

    #[test]
    fn test_decode_normalizes_ticker() {
        let decoded = IndicatorCall::decode(&call("calculateRSI", json!({"ticker": " msft "}))).unwrap();
        assert_eq!(
            decoded,
            IndicatorCall::Rsi {
                ticker: "MSFT".to_string()
            }
        );
        assert_eq!(decoded.kind(), IndicatorKind::Rsi);
        assert_eq!(decoded.ticker(), "MSFT");
    }

    #[test]
    fn test_decode_drops_extra_keys() {
        let decoded = IndicatorCall::decode(&call(
            "calculateSMA",
            json!({"ticker": "AAPL", "window": 20, "period": "1y", "adjust": true}),
        ))
        .unwrap();
        assert_eq!(
            decoded,
            IndicatorCall::Sma {
                ticker: "AAPL".to_string(),
                window: 20
            }
        );

        let decoded =
            IndicatorCall::decode(&call("getStockPrice", json!({"ticker": "TSLA", "window": 5})))
                .unwrap();
        assert_eq!(
            decoded,
            IndicatorCall::Price {
                ticker: "TSLA".to_string()
            }
        );
    }

    #[test]
    fn test_whitelist_keeps_required_only() {
        let kept = whitelist(
            IndicatorKind::Ema,
            json!({"ticker": "NVDA", "window": 10, "extra": 1}),
        )
        .unwrap();
        assert_eq!(kept, json!({"ticker": "NVDA", "window": 10}));
    }

    #[test]
    fn test_decode_rejects_missing_required() {
        let err = IndicatorCall::decode(&call("calculateEMA", json!({"ticker": "AAPL"}))).unwrap_err();
        assert!(matches!(
            err,
            SageError::InvalidArguments { ref function, .. } if function == "calculateEMA"
        ));
        assert!(err.to_string().contains("missing `window`"));
    }

    #[test]
    fn test_decode_rejects_bad_values() {
        let cases = [
            call("calculateSMA", json!({"ticker": "AAPL", "window": 0})),
            call("calculateSMA", json!({"ticker": "AAPL", "window": -3})),
            call("calculateSMA", json!({"ticker": "AAPL", "window": "20"})),
            call("calculateSMA", json!({"ticker": "AAPL", "window": 20.5})),
            call("calculateSMA", json!({"ticker": "AAPL", "window": -4.0})),
            call("calculateSMA", json!({"ticker": "AAPL", "window": 0.0})),
            call("getStockPrice", json!({"ticker": "   "})),
            call("getStockPrice", json!({"ticker": 42})),
            call("getStockPrice", json!(["AAPL"])),
            FunctionCall::new("getStockPrice", "{not json"),
        ];
        for case in &cases {
            let err = IndicatorCall::decode(case).unwrap_err();
            assert!(
                matches!(err, SageError::InvalidArguments { .. }),
                "{case:?} gave {err}"
            );
        }
    }

    #[test]
    fn test_decode_accepts_integral_float_window() {
        let decoded =
            IndicatorCall::decode(&call("calculateEMA", json!({"ticker": "AAPL", "window": 20.0}))).unwrap();
        assert_eq!(
            decoded,
            IndicatorCall::Ema {
                ticker: "AAPL".to_string(),
                window: 20
            }
        );
    }

    #[test]
    fn test_decode_unknown_function_fails_closed() {
        let err = IndicatorCall::decode(&call("deleteEverything", json!({"ticker": "AAPL"}))).unwrap_err();
        assert!(matches!(err, SageError::UnknownFunction(ref name) if name == "deleteEverything"));
    }
}
