use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;

use crate::db::{self, get_connection, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::vehicles;
use crate::schema::vehicles::dsl::*;
use vehiclemanager_core::errors::{Error, Result};
use vehiclemanager_core::settings::{SourceKind, SourceSettings};
use vehiclemanager_core::utils::valuation_date_today;
use vehiclemanager_core::vehicles::{
    matches_make_or_model, Vehicle, VehicleFields, VehicleSourceTrait,
};

use super::model::{NewVehicleDB, VehicleDB};

/// Vehicle source backed by a local SQLite database.
pub struct SqliteVehicleSource {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl SqliteVehicleSource {
    /// Creates a new SqliteVehicleSource instance
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }

    /// Opens (or creates) the database at `db_path`, applies pending
    /// migrations and starts the writer. Must be called within a tokio
    /// runtime.
    pub fn open(db_path: &str, timeout: Duration) -> Result<Self> {
        let db_path = db::init(db_path)?;
        let pool = db::create_pool(&db_path, timeout)?;
        db::run_migrations(&pool)?;
        let writer = db::spawn_writer(pool.clone(), timeout);
        info!("Opened vehicle database at {}", db_path);
        Ok(Self::new(pool, writer))
    }

    /// Builds the direct store from source settings.
    pub fn from_settings(settings: &SourceSettings) -> Result<Self> {
        Self::open(&settings.database_path, settings.request_timeout)
    }
}

fn decode_all(rows: Vec<VehicleDB>) -> Result<Vec<Vehicle>> {
    let today = valuation_date_today();
    rows.into_iter()
        .map(|row| row.into_vehicle(today).map_err(Error::from))
        .collect()
}

#[async_trait]
impl VehicleSourceTrait for SqliteVehicleSource {
    fn kind(&self) -> SourceKind {
        SourceKind::DirectStore
    }

    async fn list_vehicles(&self) -> Result<Vec<Vehicle>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = vehicles
            .select(VehicleDB::as_select())
            .order(id.asc())
            .load::<VehicleDB>(&mut conn)
            .into_core()?;
        decode_all(rows)
    }

    async fn get_vehicle(&self, vehicle_id: i64) -> Result<Vehicle> {
        let mut conn = get_connection(&self.pool)?;
        let row = vehicles
            .select(VehicleDB::as_select())
            .find(vehicle_id)
            .first::<VehicleDB>(&mut conn)
            .optional()
            .into_core()?
            .ok_or_else(|| Error::not_found(vehicle_id))?;
        Ok(row.into_vehicle(valuation_date_today())?)
    }

    async fn search_vehicles(&self, text: &str) -> Result<Vec<Vehicle>> {
        if text.is_empty() {
            return self.list_vehicles().await;
        }

        // SQLite's LIKE only folds ASCII case, so matching happens here with
        // the same rule as the other sources. Rows are decoded after the
        // filter so an unrelated corrupt row does not fail the search.
        let needle = text.to_lowercase();
        let mut conn = get_connection(&self.pool)?;
        let rows = vehicles
            .select(VehicleDB::as_select())
            .order(id.asc())
            .load::<VehicleDB>(&mut conn)
            .into_core()?
            .into_iter()
            .filter(|row| matches_make_or_model(&row.make, &row.model, &needle))
            .collect();
        decode_all(rows)
    }

    async fn create_vehicle(&self, fields: VehicleFields) -> Result<Vehicle> {
        let today = valuation_date_today();
        let new_row: NewVehicleDB = fields.into_new_vehicle(today)?.into();

        let created = self
            .writer
            .exec(move |conn| {
                let row = diesel::insert_into(vehicles::table)
                    .values(&new_row)
                    .returning(VehicleDB::as_returning())
                    .get_result::<VehicleDB>(conn)
                    .into_core()?;
                Ok(row.into_vehicle(today)?)
            })
            .await?;

        debug!("Inserted vehicle {}", created.id);
        Ok(created)
    }

    async fn update_vehicle(&self, vehicle_id: i64, fields: VehicleFields) -> Result<Vehicle> {
        let today = valuation_date_today();
        self.writer
            .exec(move |conn| {
                let mut row = vehicles
                    .select(VehicleDB::as_select())
                    .find(vehicle_id)
                    .first::<VehicleDB>(conn)
                    .optional()
                    .into_core()?
                    .ok_or_else(|| Error::not_found(vehicle_id))?;

                let updated = row.clone().into_vehicle(today)?.with_fields(fields, today)?;
                row.apply(&updated, chrono::Utc::now().naive_utc());

                diesel::update(vehicles.find(vehicle_id))
                    .set(&row)
                    .execute(conn)
                    .into_core()?;

                Ok(updated)
            })
            .await
    }

    async fn delete_vehicle(&self, vehicle_id: i64) -> Result<()> {
        let affected_rows = self
            .writer
            .exec(move |conn| {
                diesel::delete(vehicles.find(vehicle_id))
                    .execute(conn)
                    .into_core()
            })
            .await?;

        if affected_rows == 0 {
            return Err(Error::not_found(vehicle_id));
        }
        debug!("Deleted vehicle {}", vehicle_id);
        Ok(())
    }
}
