//! Route export for sharing and external tooling.
//!
//! An export is a JSON array holding every parsed section in order followed
//! by one trailing string, `"pob-code:<code>"` or `"pob-code:none"`.

use anyhow::{Context, Result, bail};
use serde_json::Value;

use exile_data::{Route, RouteSection};

const POB_PREFIX: &str = "pob-code:";
const POB_NONE: &str = "none";

/// Serialize `route` and the optional Path of Building code.
///
/// # Errors
/// Fails only if a section cannot be converted to JSON.
pub fn export_route(route: &[RouteSection], pob_code: Option<&str>) -> Result<String> {
    let mut items = route
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<Value>, _>>()
        .context("error converting route sections to JSON")?;
    let code = pob_code.map(str::trim).filter(|c| !c.is_empty()).unwrap_or(POB_NONE);
    items.push(Value::String(format!("{POB_PREFIX}{code}")));
    serde_json::to_string_pretty(&items).context("error serializing route export")
}

/// Read an export back into its sections and build code.
///
/// # Errors
/// Fails when the text is not a JSON array ending in a `pob-code:` marker or
/// when a section does not match the route layout.
pub fn import_route(text: &str) -> Result<(Route, Option<String>)> {
    let value: Value = serde_json::from_str(text).context("route export is not valid JSON")?;
    let Value::Array(mut items) = value else {
        bail!("route export must be a JSON array");
    };
    let Some(Value::String(marker)) = items.pop() else {
        bail!("route export is missing its trailing '{POB_PREFIX}' entry");
    };
    let Some(code) = marker.strip_prefix(POB_PREFIX) else {
        bail!("unexpected trailing entry '{marker}' in route export");
    };
    let code = (code != POB_NONE).then(|| code.to_string());
    let route = items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            serde_json::from_value::<RouteSection>(item).with_context(|| format!("reading exported section {idx}"))
        })
        .collect::<Result<Route>>()?;
    Ok((route, code))
}
