use crate::agents::tools::parameters;
use crate::error::ToolError;
use rig::completion::ToolDefinition;
use rig::tool::Tool;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const YAHOO_CHART_API: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct StockArgs {
    /// Ticker symbol, e.g. "AAPL" or "MC.PA".
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub previous_close: Option<f64>,
    pub change_percent: Option<f64>,
    pub currency: Option<String>,
    pub exchange: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: String,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    exchange_name: Option<String>,
    #[serde(default)]
    regular_market_price: Option<f64>,
    #[serde(default)]
    chart_previous_close: Option<f64>,
}

/// Latest quote for a ticker from the public Yahoo chart endpoint.
pub struct StockPrice {
    http: reqwest::Client,
    endpoint: String,
}

impl StockPrice {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            endpoint: YAHOO_CHART_API.to_string(),
        }
    }
}

impl Tool for StockPrice {
    const NAME: &'static str = "stock_price";

    type Error = ToolError;
    type Args = StockArgs;
    type Output = Quote;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Get the latest market price, previous close and daily change for a stock ticker."
                .to_string(),
            parameters: parameters::<StockArgs>(),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let symbol = normalize_symbol(&args.symbol)?;
        log::info!("Stock lookup: {}", symbol);

        let envelope: ChartEnvelope = self
            .http
            .get(format!("{}/{}", self.endpoint, symbol))
            .query(&[("range", "5d"), ("interval", "1d")])
            .header(reqwest::header::USER_AGENT, "Mozilla/5.0 (agent-hub)")
            .send()
            .await?
            .json()
            .await?;

        quote_from(envelope)
    }
}

fn normalize_symbol(raw: &str) -> Result<String, ToolError> {
    let symbol = raw.trim().to_uppercase();
    let valid = !symbol.is_empty()
        && symbol.len() <= 15
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));
    if valid {
        Ok(symbol)
    } else {
        Err(ToolError::InvalidInput(format!("invalid ticker symbol '{}'", raw)))
    }
}

fn quote_from(envelope: ChartEnvelope) -> Result<Quote, ToolError> {
    if let Some(error) = envelope.chart.error.filter(|e| !e.is_null()) {
        return Err(ToolError::UnexpectedResponse(error.to_string()));
    }
    let meta = envelope
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .map(|r| r.meta)
        .ok_or_else(|| ToolError::UnexpectedResponse("no chart result".to_string()))?;
    let price = meta
        .regular_market_price
        .ok_or_else(|| ToolError::UnexpectedResponse(format!("no price for {}", meta.symbol)))?;

    let change_percent = meta
        .chart_previous_close
        .filter(|prev| *prev != 0.0)
        .map(|prev| ((price - prev) / prev * 100.0 * 100.0).round() / 100.0);

    Ok(Quote {
        symbol: meta.symbol,
        price,
        previous_close: meta.chart_previous_close,
        change_percent,
        currency: meta.currency,
        exchange: meta.exchange_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_symbols() {
        assert_eq!(normalize_symbol(" aapl ").unwrap(), "AAPL");
        assert_eq!(normalize_symbol("mc.pa").unwrap(), "MC.PA");
        assert!(normalize_symbol("").is_err());
        assert!(normalize_symbol("AAPL; rm -rf /").is_err());
    }

    #[test]
    fn builds_quote_with_change() {
        let envelope: ChartEnvelope = serde_json::from_value(json!({
            "chart": {
                "result": [{"meta": {
                    "symbol": "AAPL",
                    "currency": "USD",
                    "exchangeName": "NMS",
                    "regularMarketPrice": 110.0,
                    "chartPreviousClose": 100.0
                }}],
                "error": null
            }
        }))
        .unwrap();
        let quote = quote_from(envelope).unwrap();
        assert_eq!(quote.symbol, "AAPL");
        assert_eq!(quote.change_percent, Some(10.0));
        assert_eq!(quote.currency.as_deref(), Some("USD"));
    }

    #[test]
    fn surfaces_api_error() {
        let envelope: ChartEnvelope = serde_json::from_value(json!({
            "chart": {"result": null, "error": {"code": "Not Found", "description": "No data found"}}
        }))
        .unwrap();
        assert!(matches!(quote_from(envelope), Err(ToolError::UnexpectedResponse(_))));
    }
}
