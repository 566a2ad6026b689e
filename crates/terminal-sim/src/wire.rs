use chrono::{Datelike, Timelike};
use encoding_rs::WINDOWS_1251;
use luatrader_core::{Candle, FUTURES_CLASS_CODE};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::Result;

/// Next Windows-1251 line as UTF-8, `None` at EOF
pub(crate) async fn read_line<R: AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
    buf: &mut Vec<u8>,
) -> Result<Option<String>> {
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    let (text, _, _) = WINDOWS_1251.decode(buf);
    Ok(Some(text.trim_end_matches(['\r', '\n']).to_string()))
}

/// Write a UTF-8 line as Windows-1251, `\n`-terminated like the bridge does
pub(crate) async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> Result<()> {
    let (bytes, _, _) = WINDOWS_1251.encode(line);
    writer.write_all(&bytes).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

/// Bar payload in the bridge's shape
pub fn bar_json(candle: &Candle, interval: u32) -> Value {
    let t = candle.date_time;
    json!({
        "low": number(candle.low),
        "close": number(candle.close),
        "high": number(candle.high),
        "open": number(candle.open),
        "volume": number(candle.volume),
        "datetime": {
            "ms": 0,
            "sec": t.second(),
            "min": t.minute(),
            "hour": t.hour(),
            "day": t.day(),
            "month": t.month(),
            "year": t.year(),
        },
        "sec": candle.security_code,
        "class": FUTURES_CLASS_CODE,
        "interval": interval,
    })
}

/// The bridge sends prices as JSON numbers
fn number(value: Decimal) -> Value {
    json!(value.to_f64().unwrap_or_default())
}
