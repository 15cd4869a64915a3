//! CSV export of scored listings.
//!
//! Column order is part of the interface: downstream spreadsheets key on
//! it. Money renders as `$X,XXX.XX`, ROI as `X.X%`.

use thiserror::Error;

use propscout_scoring::ScoredListing;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV render error: {0}")]
    Render(String),
}

const COLUMNS: [&str; 13] = [
    "Address",
    "ZIP Code",
    "List Price",
    "Suggested Offer",
    "Motivation Score",
    "Estimated ROI %",
    "Days on Market",
    "Price Drops",
    "Owner Status",
    "Tax Assessed Value",
    "Square Feet",
    "Property Type",
    "Listing Agent",
];

/// Render scored listings as a CSV document, header included.
pub fn export_csv(listings: &[ScoredListing]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(COLUMNS)?;

    for s in listings {
        let l = &s.listing;
        writer.write_record([
            l.address.as_str(),
            l.zip_code.as_str(),
            &format_currency(l.price),
            &format_currency(s.suggested_offer),
            &format!("{:.1}", s.motivation_score),
            &format!("{:.1}%", s.estimated_roi),
            &l.days_on_market.to_string(),
            &l.price_drops.to_string(),
            l.owner_status.as_str(),
            &format_currency(l.tax_assessed_value),
            &format!("{:.0}", l.square_feet),
            l.property_type.as_str(),
            l.listing_agent.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Render(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Render(e.to_string()))
}

/// `$X,XXX.XX` with thousands grouping, cents rounded half-up.
fn format_currency(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let cents = (value.abs() * 100.0).round() as u128;
    let dollars = (cents / 100).to_string();
    let rem = cents % 100;

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, c) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{sign}${grouped}.{rem:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use propscout_common::entities::{MergedListing, OwnerStatus};
    use uuid::Uuid;

    fn sample() -> ScoredListing {
        ScoredListing {
            id: Uuid::new_v4(),
            listing: MergedListing {
                address: "12 Oak St, Springfield".to_string(),
                zip_code: "62704".to_string(),
                price: 250000.5,
                square_feet: 1500.0,
                days_on_market: 95,
                price_drops: 2,
                property_type: "single_family".to_string(),
                listing_agent: "ACME Realty".to_string(),
                tax_assessed_value: 260000.0,
                owner_status: OwnerStatus::Absentee,
                pre_foreclosure: Some(false),
            },
            motivation_score: 68.0,
            suggested_offer: 212500.42,
            estimated_roi: 17.25,
        }
    }

    #[test]
    fn test_currency_formatting() {
        assert_eq!(format_currency(250000.5), "$250,000.50");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(999.994), "$999.99");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(-5000.0), "-$5,000.00");
    }

    #[test]
    fn test_header_order_is_fixed() {
        let csv = export_csv(&[]).unwrap();
        assert_eq!(
            csv.trim_end(),
            "Address,ZIP Code,List Price,Suggested Offer,Motivation Score,\
             Estimated ROI %,Days on Market,Price Drops,Owner Status,\
             Tax Assessed Value,Square Feet,Property Type,Listing Agent"
        );
    }

    #[test]
    fn test_row_rendering() {
        let csv = export_csv(&[sample()]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains("$250,000.50"));
        assert!(row.contains("$212,500.42"));
        assert!(row.contains("68.0"));
        assert!(row.contains("17.2%"));
        assert!(row.contains("absentee"));
        assert!(row.contains("1500"));
        // quoted commas (address + three currency fields) are not column breaks
        assert_eq!(row.split(',').count(), COLUMNS.len() + 4);
        assert!(row.starts_with("\"12 Oak St, Springfield\""));
    }
}
