//! Polish-style address formatting

/// Address parts used to build a display address
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressComponents {
    pub poi_name: Option<String>,
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub display_name: String,
}

/// Format an address the way Polish addresses are written
///
/// A POI name wins, then `ul. <street> <number>`, then `ul. <street>`, and
/// finally the engine's raw display name. Blank parts count as absent.
#[must_use]
pub fn format_polish_address(parts: &AddressComponents) -> String {
    if let Some(poi) = present(parts.poi_name.as_deref()) {
        return poi.to_string();
    }

    match (
        present(parts.street.as_deref()),
        present(parts.house_number.as_deref()),
    ) {
        (Some(street), Some(number)) => format!("ul. {street} {number}"),
        (Some(street), None) => format!("ul. {street}"),
        _ => parts.display_name.clone(),
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
