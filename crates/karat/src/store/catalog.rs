//! SKUs, manufacturers and material lots.

use std::path::Path;

use chrono::Utc;
use rusqlite::Connection;

use super::{ErpStore, ListResponse};
use crate::db::lot_repo::{self, AllocationRow, LotFilter};
use crate::db::manufacturer_repo::{self, ManufacturerRow};
use crate::db::sku_repo::{self, SkuRow};
use crate::error::{KaratError, Result};
use crate::ids;
use crate::imaging::{self, CompressedImage};
use crate::models::{format_timestamp, Lot, LotKind};

#[derive(Debug, Clone)]
pub struct NewSku {
    pub code: String,
    pub name: String,
    pub category: String,
    pub metal: String,
    pub stone_count: i64,
    pub diamond_count: i64,
}

#[derive(Debug, Clone)]
pub struct NewManufacturer {
    pub name: String,
    pub contact: Option<String>,
    pub rating: f64,
    pub capacity: i64,
}

#[derive(Debug, Clone)]
pub struct NewLot {
    pub kind: LotKind,
    pub description: String,
    pub supplier: Option<String>,
    pub quantity: i64,
    pub weight_ct: f64,
}

#[derive(Debug, Clone, Default)]
pub struct LotQuery {
    pub kind: Option<LotKind>,
    pub available_only: bool,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl ErpStore {
    pub fn create_sku(&self, new: NewSku) -> Result<SkuRow> {
        let row = sku_row(new)?;
        self.db.with_tx(|tx| insert_sku(tx, &row, None))?;

        log::info!("Created SKU {} ({})", row.code, row.name);
        Ok(row)
    }

    /// Creates a SKU together with its product image.
    ///
    /// The image is read and compressed first, so a bad file leaves no SKU
    /// behind.
    pub fn create_sku_with_image(
        &self,
        new: NewSku,
        image_path: &Path,
    ) -> Result<(SkuRow, CompressedImage)> {
        let _span = tracing::info_span!("store.create_sku_with_image", code = %new.code).entered();

        let mut row = sku_row(new)?;
        let compressed = imaging::compress_file(image_path, &self.config.images)?;
        self.db
            .with_tx(|tx| insert_sku(tx, &row, Some(compressed.bytes.as_slice())))?;
        row.has_image = true;

        log::info!(
            "Created SKU {} ({}) with {}x{} image",
            row.code,
            row.name,
            compressed.width,
            compressed.height
        );
        Ok((row, compressed))
    }

    /// Finds a SKU by ID or code.
    pub fn get_sku(&self, id_or_code: &str) -> Result<SkuRow> {
        self.db.with_conn(|conn| {
            let found = match sku_repo::find_by_id(conn, id_or_code)? {
                Some(row) => Some(row),
                None => sku_repo::find_by_code(conn, id_or_code)?,
            };
            found.ok_or_else(|| KaratError::not_found("SKU", id_or_code))
        })
    }

    pub fn list_skus(&self) -> Result<Vec<SkuRow>> {
        self.db
            .with_conn(|conn| sku_repo::list(conn).map_err(KaratError::from))
    }

    /// Compresses `data` with the configured image settings and stores it
    /// as the SKU's product image.
    pub fn set_sku_image(&self, id_or_code: &str, data: &[u8]) -> Result<CompressedImage> {
        let _span = tracing::info_span!("store.set_sku_image", sku = %id_or_code).entered();

        let sku = self.get_sku(id_or_code)?;
        let compressed = imaging::compress(data, &self.config.images)?;
        self.store_sku_image(&sku, compressed)
    }

    pub fn set_sku_image_file(&self, id_or_code: &str, path: &Path) -> Result<CompressedImage> {
        let _span = tracing::info_span!("store.set_sku_image", sku = %id_or_code).entered();

        let sku = self.get_sku(id_or_code)?;
        let compressed = imaging::compress_file(path, &self.config.images)?;
        self.store_sku_image(&sku, compressed)
    }

    fn store_sku_image(&self, sku: &SkuRow, compressed: CompressedImage) -> Result<CompressedImage> {
        self.db.with_conn(|conn| {
            sku_repo::set_image(conn, &sku.id, &compressed.bytes).map_err(KaratError::from)
        })?;

        log::info!(
            "Stored {}x{} image for SKU {} ({} bytes)",
            compressed.width,
            compressed.height,
            sku.code,
            compressed.bytes.len()
        );
        Ok(compressed)
    }

    pub fn sku_image(&self, id_or_code: &str) -> Result<Option<Vec<u8>>> {
        let sku = self.get_sku(id_or_code)?;
        self.db
            .with_conn(|conn| sku_repo::get_image(conn, &sku.id).map_err(KaratError::from))
    }

    pub fn add_manufacturer(&self, new: NewManufacturer) -> Result<ManufacturerRow> {
        if new.name.trim().is_empty() {
            return Err(KaratError::InvalidInput(
                "Manufacturer name is empty".to_string(),
            ));
        }
        if !(0.0..=5.0).contains(&new.rating) {
            return Err(KaratError::InvalidInput(format!(
                "Rating must be between 0 and 5, got {}",
                new.rating
            )));
        }
        if new.capacity < 0 {
            return Err(KaratError::InvalidInput(
                "Capacity cannot be negative".to_string(),
            ));
        }

        let now = format_timestamp(Utc::now());
        let row = ManufacturerRow {
            id: ids::new_id(),
            name: new.name.trim().to_string(),
            contact: new.contact,
            rating: new.rating,
            current_load: 0,
            capacity: new.capacity,
            created_at: now.clone(),
            updated_at: now,
        };
        self.db
            .with_conn(|conn| manufacturer_repo::insert(conn, &row).map_err(KaratError::from))?;

        log::info!("Added manufacturer {} (capacity {})", row.name, row.capacity);
        Ok(row)
    }

    pub fn get_manufacturer(&self, id: &str) -> Result<ManufacturerRow> {
        self.db.with_conn(|conn| {
            manufacturer_repo::find_by_id(conn, id)?
                .ok_or_else(|| KaratError::not_found("Manufacturer", id))
        })
    }

    /// Manufacturers, best rated first.
    pub fn list_manufacturers(&self) -> Result<Vec<ManufacturerRow>> {
        self.db
            .with_conn(|conn| manufacturer_repo::list(conn).map_err(KaratError::from))
    }

    /// Records a received parcel of stones or diamonds.
    pub fn receive_lot(&self, new: NewLot) -> Result<Lot> {
        let _span = tracing::info_span!("store.receive_lot", kind = %new.kind).entered();

        if new.quantity <= 0 || !new.weight_ct.is_finite() || new.weight_ct <= 0.0 {
            return Err(KaratError::InvalidInput(format!(
                "Lot quantity and weight must be positive (got {} pcs, {} ct)",
                new.quantity, new.weight_ct
            )));
        }

        let lot = self.db.with_tx(|tx| {
            let lot = Lot {
                id: ids::new_id(),
                display_id: self.next_display_id(tx, ids::LOT_PREFIX)?,
                kind: new.kind,
                description: new.description,
                supplier: new.supplier,
                total_quantity: new.quantity,
                available_quantity: new.quantity,
                total_weight_ct: new.weight_ct,
                available_weight_ct: new.weight_ct,
                received_at: Utc::now(),
            };
            lot_repo::insert(tx, &lot.to_row())?;
            Ok::<_, KaratError>(lot)
        })?;

        log::info!(
            "Received {} lot {}: {} pcs, {:.3} ct",
            lot.kind,
            lot.display_id,
            lot.total_quantity,
            lot.total_weight_ct
        );
        Ok(lot)
    }

    /// Finds a lot by ID or display ID.
    pub fn get_lot(&self, id: &str) -> Result<Lot> {
        self.db.with_conn(|conn| {
            let row = lot_repo::find_by_id(conn, id)?
                .ok_or_else(|| KaratError::not_found("Lot", id))?;
            Lot::from_row(&row)
        })
    }

    pub fn lot_allocations(&self, id: &str) -> Result<Vec<AllocationRow>> {
        let lot = self.get_lot(id)?;
        self.db.with_conn(|conn| {
            lot_repo::allocations_for_lot(conn, &lot.id).map_err(KaratError::from)
        })
    }

    pub fn list_lots(&self, query: &LotQuery) -> Result<ListResponse<Lot>> {
        let (limit, offset) = self.page(query.limit, query.offset);
        let filter = LotFilter {
            kind: query.kind.map(|k| k.to_string()),
            available_only: query.available_only,
            limit: Some(limit),
            offset: Some(offset),
        };

        self.db.with_conn(|conn| {
            let (rows, total) = lot_repo::query(conn, &filter)?;
            let items = rows.iter().map(Lot::from_row).collect::<Result<Vec<_>>>()?;
            Ok(ListResponse {
                items,
                total,
                limit,
                offset,
            })
        })
    }
}

/// Validates `new` and builds the row to insert.
fn sku_row(new: NewSku) -> Result<SkuRow> {
    let code = new.code.trim().to_string();
    if !ids::is_valid_sku_code(&code) {
        return Err(KaratError::InvalidInput(format!(
            "Invalid SKU code '{}'",
            code
        )));
    }
    if new.name.trim().is_empty() {
        return Err(KaratError::InvalidInput("SKU name is empty".to_string()));
    }
    if new.stone_count < 0 || new.diamond_count < 0 {
        return Err(KaratError::InvalidInput(
            "Stone and diamond counts cannot be negative".to_string(),
        ));
    }

    Ok(SkuRow {
        id: ids::new_id(),
        code,
        name: new.name.trim().to_string(),
        category: new.category,
        metal: new.metal,
        stone_count: new.stone_count,
        diamond_count: new.diamond_count,
        has_image: false,
        created_at: format_timestamp(Utc::now()),
    })
}

fn insert_sku(conn: &Connection, row: &SkuRow, image: Option<&[u8]>) -> Result<()> {
    if sku_repo::find_by_code(conn, &row.code)?.is_some() {
        return Err(KaratError::InvalidInput(format!(
            "SKU code '{}' already exists",
            row.code
        )));
    }
    sku_repo::insert(conn, row)?;
    if let Some(bytes) = image {
        sku_repo::set_image(conn, &row.id, bytes)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_create_and_find_sku() {
        let store = store();
        let id = sku(&store, "RING-HALO-01");

        let by_code = store.get_sku("RING-HALO-01").unwrap();
        assert_eq!(by_code.id, id);
        let by_id = store.get_sku(&id).unwrap();
        assert_eq!(by_id.code, "RING-HALO-01");
        assert_eq!(store.list_skus().unwrap().len(), 1);
    }

    #[test]
    fn test_rejects_bad_sku_code() {
        let store = store();
        let err = store
            .create_sku(NewSku {
                code: "ring halo".to_string(),
                name: "Halo".to_string(),
                category: String::new(),
                metal: String::new(),
                stone_count: 0,
                diamond_count: 0,
            })
            .unwrap_err();
        assert!(matches!(err, KaratError::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_duplicate_sku_code() {
        let store = store();
        sku(&store, "PEND-01");
        let err = store
            .create_sku(NewSku {
                code: "PEND-01".to_string(),
                name: "Pendant".to_string(),
                category: String::new(),
                metal: String::new(),
                stone_count: 0,
                diamond_count: 0,
            })
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_unknown_sku() {
        let err = store().get_sku("NOPE-1").unwrap_err();
        assert!(matches!(err, KaratError::NotFound { entity: "SKU", .. }));
    }

    #[test]
    fn test_manufacturer_rating_bounds() {
        let store = store();
        let err = store
            .add_manufacturer(NewManufacturer {
                name: "Bad".to_string(),
                contact: None,
                rating: 5.5,
                capacity: 1,
            })
            .unwrap_err();
        assert!(matches!(err, KaratError::InvalidInput(_)));

        let id = manufacturer(&store, 3);
        let m = store.get_manufacturer(&id).unwrap();
        assert_eq!(m.current_load, 0);
        assert!(m.has_capacity());
    }

    #[test]
    fn test_receive_lot_assigns_display_ids() {
        let store = store();
        let first = store.get_lot(&lot(&store, LotKind::Stone, 10, 5.0)).unwrap();
        let second = store
            .get_lot(&lot(&store, LotKind::Diamond, 100, 2.5))
            .unwrap();
        assert_eq!(first.display_id, "LOT-0001");
        assert_eq!(second.display_id, "LOT-0002");
        assert_eq!(second.available_quantity, 100);
        assert_eq!(store.get_lot("LOT-0002").unwrap().id, second.id);
    }

    #[test]
    fn test_receive_lot_rejects_empty() {
        let store = store();
        let err = store
            .receive_lot(NewLot {
                kind: LotKind::Stone,
                description: String::new(),
                supplier: None,
                quantity: 0,
                weight_ct: 1.0,
            })
            .unwrap_err();
        assert!(matches!(err, KaratError::InvalidInput(_)));
    }

    #[test]
    fn test_list_lots_by_kind() {
        let store = store();
        lot(&store, LotKind::Stone, 10, 5.0);
        lot(&store, LotKind::Diamond, 100, 2.5);
        lot(&store, LotKind::Diamond, 50, 1.0);

        let page = store
            .list_lots(&LotQuery {
                kind: Some(LotKind::Diamond),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.total, 2);
        assert!(page.items.iter().all(|l| l.kind == LotKind::Diamond));
        assert_eq!(page.limit, 25);
    }

    #[test]
    fn test_sku_image_is_compressed() {
        use image::{DynamicImage, ImageFormat, RgbImage};
        use std::io::Cursor;

        let store = store();
        sku(&store, "RING-IMG-01");

        let mut png = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(2048, 1024))
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let out = store.set_sku_image("RING-IMG-01", &png).unwrap();
        assert_eq!((out.width, out.height), (1024, 512));
        assert!(store.get_sku("RING-IMG-01").unwrap().has_image);
        assert_eq!(store.sku_image("RING-IMG-01").unwrap().unwrap(), out.bytes);
    }

    fn ring(code: &str) -> NewSku {
        NewSku {
            code: code.to_string(),
            name: "Solitaire".to_string(),
            category: "ring".to_string(),
            metal: "18k".to_string(),
            stone_count: 1,
            diamond_count: 0,
        }
    }

    #[test]
    fn test_sku_with_unreadable_image_is_not_created() {
        let store = store();
        let err = store
            .create_sku_with_image(ring("RING-SOL-09"), Path::new("/nonexistent/ring.png"))
            .unwrap_err();
        assert!(matches!(
            err,
            KaratError::Image(crate::error::ImageError::ReadFile { .. })
        ));
        assert!(matches!(
            store.get_sku("RING-SOL-09").unwrap_err(),
            KaratError::NotFound { .. }
        ));

        // The code is still free.
        store.create_sku(ring("RING-SOL-09")).unwrap();
    }

    #[test]
    fn test_sku_with_undecodable_image_is_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ring.png");
        std::fs::write(&path, b"not an image").unwrap();

        let store = store();
        assert!(store.create_sku_with_image(ring("RING-SOL-10"), &path).is_err());
        assert!(store.list_skus().unwrap().is_empty());
    }

    #[test]
    fn test_sku_with_image_file() {
        use image::{DynamicImage, ImageFormat, RgbImage};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ring.png");
        DynamicImage::ImageRgb8(RgbImage::new(64, 48))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let store = store();
        let (row, compressed) = store
            .create_sku_with_image(ring("RING-SOL-11"), &path)
            .unwrap();
        assert!(row.has_image);
        assert_eq!((compressed.width, compressed.height), (64, 48));
        assert!(store.get_sku("RING-SOL-11").unwrap().has_image);
        assert_eq!(
            store.sku_image("RING-SOL-11").unwrap().unwrap(),
            compressed.bytes
        );
    }

    #[test]
    fn test_receive_lot_rejects_non_finite_weight() {
        let store = store();
        for weight_ct in [f64::INFINITY, f64::NAN, -1.0] {
            let err = store
                .receive_lot(NewLot {
                    kind: LotKind::Diamond,
                    description: String::new(),
                    supplier: None,
                    quantity: 10,
                    weight_ct,
                })
                .unwrap_err();
            assert!(matches!(err, KaratError::InvalidInput(_)));
        }
        assert_eq!(store.list_lots(&LotQuery::default()).unwrap().total, 0);
    }
}
