use quick_xml::{events::Event, Reader};
use serde::Deserialize;

use crate::{data_objects::CatalogItem, CatalogApiError};

/// Extracts the unescaped text content of the first element with the given local name. SOAP
/// responses prefix element names per namespace, so matching is on the local part only.
pub(crate) fn element_text(xml: &str, local_name: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    let mut capture = false;
    let mut text = String::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == local_name.as_bytes() => capture = true,
            Ok(Event::Text(t)) if capture => match t.unescape() {
                Ok(fragment) => text.push_str(&fragment),
                Err(_) => return None,
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == local_name.as_bytes() => {
                let trimmed = text.trim();
                return if trimmed.is_empty() { None } else { Some(trimmed.to_string()) };
            },
            Ok(Event::Eof) => return None,
            Err(_) => return None,
            _ => {},
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct CatalogDataSet {
    #[serde(rename = "Table", default)]
    rows: Vec<CatalogRow>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogRow {
    #[serde(default)]
    item_id: Option<String>,
    #[serde(default)]
    item_code: Option<String>,
    #[serde(rename = "item_vendorCode", default)]
    item_vendor_code: Option<String>,
}

/// Parses the inner catalog document (a `<NewDataSet>` of `<Table>` rows) into catalog items.
/// Rows without an item id or stock code are dropped; an empty vendor code is treated as absent.
pub(crate) fn parse_catalog_rows(xml: &str) -> Result<Vec<CatalogItem>, CatalogApiError> {
    let dataset: CatalogDataSet = quick_xml::de::from_str(xml).map_err(|e| CatalogApiError::XmlError(e.to_string()))?;
    let items = dataset
        .rows
        .into_iter()
        .filter_map(|row| {
            let item_id = row.item_id?;
            let item_code = row.item_code?;
            let vendor_code = row.item_vendor_code.filter(|v| !v.trim().is_empty());
            Some(CatalogItem { item_id, item_code, vendor_code })
        })
        .collect();
    Ok(items)
}
