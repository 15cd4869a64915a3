//! PostgreSQL-backed listing store.

use async_trait::async_trait;
use tokio_postgres::{NoTls, Row};
use tracing::error;
use uuid::Uuid;

use propscout_common::entities::{normalize_address, MergedListing, OwnerStatus};

use crate::error::{Result, StoreError};
use crate::store::{ListingStore, StoredListing};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS listings (
    id                 UUID PRIMARY KEY,
    address            TEXT NOT NULL,
    address_key        TEXT NOT NULL UNIQUE,
    zip_code           TEXT NOT NULL,
    price              DOUBLE PRECISION NOT NULL,
    square_feet        DOUBLE PRECISION NOT NULL,
    days_on_market     INTEGER NOT NULL,
    price_drops        INTEGER NOT NULL,
    property_type      TEXT NOT NULL,
    listing_agent      TEXT NOT NULL,
    tax_assessed_value DOUBLE PRECISION NOT NULL,
    owner_status       TEXT NOT NULL,
    pre_foreclosure    BOOLEAN,
    motivation_score   DOUBLE PRECISION,
    suggested_offer    DOUBLE PRECISION,
    estimated_roi      DOUBLE PRECISION,
    created_at         TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at         TIMESTAMPTZ
);
CREATE INDEX IF NOT EXISTS listings_zip_type_idx ON listings (zip_code, property_type);
";

const RETURNING: &str = "id, address, zip_code, price, square_feet, days_on_market, \
     price_drops, property_type, listing_agent, tax_assessed_value, owner_status, \
     pre_foreclosure, motivation_score, suggested_offer, estimated_roi, created_at, updated_at";

pub struct PgListingStore {
    client: tokio_postgres::Client,
}

impl PgListingStore {
    /// Connect and drive the connection task in the background.
    pub async fn connect(url: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(url, NoTls)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "postgres connection closed");
            }
        });
        Ok(Self { client })
    }

    /// Create the schema if it does not exist yet.
    pub async fn init(&self) -> Result<()> {
        self.client.batch_execute(SCHEMA).await?;
        Ok(())
    }
}

fn row_to_stored(row: &Row) -> StoredListing {
    let listing = MergedListing {
        address: row.get("address"),
        zip_code: row.get("zip_code"),
        price: row.get("price"),
        square_feet: row.get("square_feet"),
        days_on_market: row.get::<_, i32>("days_on_market").max(0) as u32,
        price_drops: row.get::<_, i32>("price_drops").max(0) as u32,
        property_type: row.get("property_type"),
        listing_agent: row.get("listing_agent"),
        tax_assessed_value: row.get("tax_assessed_value"),
        owner_status: OwnerStatus::parse(row.get("owner_status")),
        pre_foreclosure: row.get("pre_foreclosure"),
    };
    StoredListing {
        id: row.get("id"),
        listing,
        motivation_score: row.get("motivation_score"),
        suggested_offer: row.get("suggested_offer"),
        estimated_roi: row.get("estimated_roi"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl ListingStore for PgListingStore {
    async fn upsert(&self, listing: &MergedListing) -> Result<StoredListing> {
        let sql = format!(
            "INSERT INTO listings (id, address, address_key, zip_code, price, square_feet, \
             days_on_market, price_drops, property_type, listing_agent, tax_assessed_value, \
             owner_status, pre_foreclosure) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             ON CONFLICT (address_key) DO UPDATE SET \
               address = EXCLUDED.address, \
               zip_code = EXCLUDED.zip_code, \
               price = EXCLUDED.price, \
               square_feet = EXCLUDED.square_feet, \
               days_on_market = EXCLUDED.days_on_market, \
               price_drops = EXCLUDED.price_drops, \
               property_type = EXCLUDED.property_type, \
               listing_agent = EXCLUDED.listing_agent, \
               tax_assessed_value = EXCLUDED.tax_assessed_value, \
               owner_status = EXCLUDED.owner_status, \
               pre_foreclosure = EXCLUDED.pre_foreclosure, \
               updated_at = now() \
             RETURNING {RETURNING}"
        );
        let row = self
            .client
            .query_one(
                sql.as_str(),
                &[
                    &Uuid::new_v4(),
                    &listing.address,
                    &normalize_address(&listing.address),
                    &listing.zip_code,
                    &listing.price,
                    &listing.square_feet,
                    &(listing.days_on_market as i32),
                    &(listing.price_drops as i32),
                    &listing.property_type,
                    &listing.listing_agent,
                    &listing.tax_assessed_value,
                    &listing.owner_status.as_str(),
                    &listing.pre_foreclosure,
                ],
            )
            .await?;
        Ok(row_to_stored(&row))
    }

    async fn set_scores(&self, id: Uuid, motivation: f64, offer: f64, roi: f64) -> Result<()> {
        self.client
            .execute(
                "UPDATE listings SET motivation_score = $2, suggested_offer = $3, \
                 estimated_roi = $4, updated_at = now() WHERE id = $1",
                &[&id, &motivation, &offer, &roi],
            )
            .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredListing>> {
        let sql = format!("SELECT {RETURNING} FROM listings WHERE id = $1");
        let row = self.client.query_opt(sql.as_str(), &[&id]).await?;
        Ok(row.as_ref().map(row_to_stored))
    }

    async fn get_many(&self, ids: &[Uuid]) -> Result<Vec<StoredListing>> {
        let id_vec: Vec<Uuid> = ids.to_vec();
        let sql = format!("SELECT {RETURNING} FROM listings WHERE id = ANY($1) ORDER BY id");
        let rows = self.client.query(sql.as_str(), &[&id_vec]).await?;
        Ok(rows.iter().map(row_to_stored).collect())
    }

    async fn comps(
        &self,
        subject_id: Uuid,
        zip_code: &str,
        property_type: &str,
        max: usize,
    ) -> Result<Vec<MergedListing>> {
        let sql = format!(
            "SELECT {RETURNING} FROM listings \
             WHERE zip_code = $1 AND property_type = $2 AND id <> $3 \
             ORDER BY id LIMIT $4"
        );
        let rows = self
            .client
            .query(sql.as_str(), &[&zip_code, &property_type, &subject_id, &(max as i64)])
            .await?;
        Ok(rows.iter().map(|r| row_to_stored(r).listing).collect())
    }
}
