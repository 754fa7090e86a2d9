//! Sprite sheet descriptors and region lookup
//!
//! A sheet descriptor is a whitespace-delimited text file: the backing
//! image's logical name (which is also its file path), a region count,
//! then one `id name x y w h` record per region. Loading a sheet loads its
//! backing image into the [`ResourceStore`] as a side effect; the sheet
//! itself only holds region metadata and the image's name.

use std::fs;
use std::str::{FromStr, SplitWhitespace};

use rustc_hash::FxHashMap;

use crate::backend::{Rect, RenderBackend};

use super::{ResourceError, ResourceKind, ResourceStore};

/// One named, numbered region of a sheet's backing image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteRegion {
    /// Numeric id, unique within the sheet
    pub id: i32,
    /// Logical name, unique within the sheet
    pub name: String,
    /// Pixel rectangle inside the backing image
    pub rect: Rect,
}

/// A parsed sheet: backing image name, ordered regions, and id/name
/// indices for O(1) lookup. Immutable once constructed.
#[derive(Debug)]
pub struct SpriteSheet {
    name: String,
    image: String,
    regions: Vec<SpriteRegion>,
    by_id: FxHashMap<i32, usize>,
    by_name: FxHashMap<String, usize>,
}

impl SpriteSheet {
    fn from_regions(
        name: &str,
        image: &str,
        regions: Vec<SpriteRegion>,
        image_size: (u32, u32),
    ) -> Self {
        let bounds = Rect::new(0, 0, image_size.0 as i32, image_size.1 as i32);
        let mut by_id = FxHashMap::default();
        let mut by_name = FxHashMap::default();
        for (index, region) in regions.iter().enumerate() {
            debug_assert!(
                bounds.encloses(&region.rect),
                "region '{}' of sheet '{name}' exceeds the {}x{} backing image",
                region.name,
                image_size.0,
                image_size.1,
            );
            if !bounds.encloses(&region.rect) {
                log::warn!(
                    "region '{}' of sheet '{name}' exceeds the backing image bounds",
                    region.name
                );
            }

            let previous = by_id.insert(region.id, index);
            debug_assert!(
                previous.is_none(),
                "duplicate region id {} in sheet '{name}'",
                region.id
            );
            if previous.is_some() {
                log::warn!("duplicate region id {} in sheet '{name}', last one wins", region.id);
            }

            let previous = by_name.insert(region.name.clone(), index);
            debug_assert!(
                previous.is_none(),
                "duplicate region name '{}' in sheet '{name}'",
                region.name
            );
            if previous.is_some() {
                log::warn!(
                    "duplicate region name '{}' in sheet '{name}', last one wins",
                    region.name
                );
            }
        }
        Self {
            name: name.to_string(),
            image: image.to_string(),
            regions,
            by_id,
            by_name,
        }
    }

    /// The sheet's registry name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Logical name of the backing image in the resource store.
    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    /// All regions, in descriptor order.
    #[must_use]
    pub fn regions(&self) -> &[SpriteRegion] {
        &self.regions
    }

    /// Number of regions.
    #[must_use]
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Rectangle of the region with this numeric id.
    pub fn region_by_id(&self, id: i32) -> Result<Rect, ResourceError> {
        self.by_id
            .get(&id)
            .map(|&index| self.regions[index].rect)
            .ok_or_else(|| ResourceError::not_found(ResourceKind::Region, format!("id {id}")))
    }

    /// Rectangle of the region with this name.
    pub fn region_by_name(&self, name: &str) -> Result<Rect, ResourceError> {
        self.by_name
            .get(name)
            .map(|&index| self.regions[index].rect)
            .ok_or_else(|| ResourceError::not_found(ResourceKind::Region, name))
    }
}

/// Descriptor fields before index construction.
struct ParsedDescriptor {
    image: String,
    regions: Vec<SpriteRegion>,
}

fn next_field<T: FromStr>(tokens: &mut SplitWhitespace<'_>, what: &str) -> Result<T, ResourceError> {
    let token = tokens
        .next()
        .ok_or_else(|| ResourceError::Descriptor(format!("missing {what}")))?;
    token
        .parse()
        .map_err(|_| ResourceError::Descriptor(format!("invalid {what}: '{token}'")))
}

/// Parse descriptor text. Pure; file and image loading happen elsewhere.
fn parse_descriptor(text: &str) -> Result<ParsedDescriptor, ResourceError> {
    let mut tokens = text.split_whitespace();
    let image = tokens
        .next()
        .ok_or_else(|| ResourceError::Descriptor("missing backing image name".into()))?
        .to_string();
    let count: usize = next_field(&mut tokens, "region count")?;
    let mut regions = Vec::with_capacity(count);
    for index in 0..count {
        let id = next_field(&mut tokens, &format!("id of region {index}"))?;
        let name = tokens
            .next()
            .ok_or_else(|| ResourceError::Descriptor(format!("missing name of region {index}")))?
            .to_string();
        let x = next_field(&mut tokens, &format!("x of region '{name}'"))?;
        let y = next_field(&mut tokens, &format!("y of region '{name}'"))?;
        let w = next_field(&mut tokens, &format!("width of region '{name}'"))?;
        let h = next_field(&mut tokens, &format!("height of region '{name}'"))?;
        regions.push(SpriteRegion {
            id,
            name,
            rect: Rect::new(x, y, w, h),
        });
    }
    Ok(ParsedDescriptor { image, regions })
}

/// Ordered collection of sheets with name lookup.
///
/// Sheets have no individual removal; the registry lives as long as the
/// engine context that owns it.
pub struct SheetRegistry {
    sheets: Vec<SpriteSheet>,
    by_name: FxHashMap<String, usize>,
}

impl SheetRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sheets: Vec::new(),
            by_name: FxHashMap::default(),
        }
    }

    /// Parse a descriptor file and register the sheet under `name`.
    ///
    /// Loads the backing image into `resources` under the descriptor's
    /// declared image name (used as both logical name and file path). On
    /// any error nothing is registered.
    pub fn load_sheet(
        &mut self,
        backend: &mut impl RenderBackend,
        resources: &mut ResourceStore,
        name: &str,
        descriptor_path: &str,
    ) -> Result<(), ResourceError> {
        let full_path = resources.data_path(descriptor_path);
        let text = fs::read_to_string(&full_path).map_err(|err| {
            log::error!("failed to read sheet descriptor {}: {err}", full_path.display());
            ResourceError::Io(err.to_string())
        })?;
        let descriptor = parse_descriptor(&text).map_err(|err| {
            log::error!("bad sheet descriptor {}: {err}", full_path.display());
            err
        })?;
        let image = resources.load_image(backend, &descriptor.image, &descriptor.image)?;
        let sheet = SpriteSheet::from_regions(
            name,
            &descriptor.image,
            descriptor.regions,
            (image.width, image.height),
        );
        log::debug!("loaded sheet '{name}' with {} regions", sheet.region_count());
        self.insert(sheet);
        Ok(())
    }

    /// Register a copy of `source_name`'s region metadata under `name`,
    /// backed by a white-recolored reload of the source's image file.
    ///
    /// The recolored image is registered in `resources` under `name`; the
    /// derived sheet references it and shares no pixels with the source.
    pub fn derive_white(
        &mut self,
        backend: &mut impl RenderBackend,
        resources: &mut ResourceStore,
        name: &str,
        source_name: &str,
    ) -> Result<(), ResourceError> {
        let (image_file, regions) = {
            let source = self.get(source_name)?;
            (source.image().to_string(), source.regions().to_vec())
        };
        let image = resources.load_image_white(backend, name, &image_file)?;
        let sheet = SpriteSheet::from_regions(name, name, regions, (image.width, image.height));
        log::debug!("derived white sheet '{name}' from '{source_name}'");
        self.insert(sheet);
        Ok(())
    }

    /// Look up a sheet by name.
    pub fn get(&self, name: &str) -> Result<&SpriteSheet, ResourceError> {
        self.by_name
            .get(name)
            .map(|&index| &self.sheets[index])
            .ok_or_else(|| ResourceError::not_found(ResourceKind::Sheet, name))
    }

    /// Number of registered sheets.
    #[must_use]
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    fn insert(&mut self, sheet: SpriteSheet) {
        let name = sheet.name().to_string();
        self.sheets.push(sheet);
        let index = self.sheets.len() - 1;
        let previous = self.by_name.insert(name.clone(), index);
        debug_assert!(previous.is_none(), "duplicate sheet name '{name}'");
        if previous.is_some() {
            log::warn!("sheet '{name}' shadows an earlier sheet of the same name");
        }
    }
}

impl Default for SheetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessBackend;

    use std::fs;

    use tempfile::TempDir;

    const DESCRIPTOR: &str = "\
atlas.png 3
0 idle 0 0 16 16
1 run 16 0 16 16
2 jump 0 16 16 32
";

    /// Lay out a 64x64 backing image and a descriptor naming it.
    fn write_fixtures(dir: &TempDir) {
        let image = image::RgbaImage::from_pixel(64, 64, image::Rgba([40, 90, 160, 255]));
        image.save(dir.path().join("atlas.png")).unwrap();
        fs::write(dir.path().join("atlas.txt"), DESCRIPTOR).unwrap();
    }

    fn loaded_registry(dir: &TempDir) -> (HeadlessBackend, ResourceStore, SheetRegistry) {
        write_fixtures(dir);
        let mut backend = HeadlessBackend::new();
        let mut resources = ResourceStore::new();
        resources.set_base_dir(dir.path());
        let mut sheets = SheetRegistry::new();
        sheets
            .load_sheet(&mut backend, &mut resources, "atlas", "atlas.txt")
            .unwrap();
        (backend, resources, sheets)
    }

    #[test]
    fn test_load_sheet_builds_both_indices() {
        let dir = TempDir::new().unwrap();
        let (_backend, _resources, sheets) = loaded_registry(&dir);

        let sheet = sheets.get("atlas").unwrap();
        assert_eq!(sheet.region_count(), 3);
        assert_eq!(sheet.image(), "atlas.png");

        // Every record is reachable through both indices with the exact
        // rectangle from the descriptor.
        assert_eq!(sheet.region_by_id(0).unwrap(), Rect::new(0, 0, 16, 16));
        assert_eq!(sheet.region_by_name("idle").unwrap(), Rect::new(0, 0, 16, 16));
        assert_eq!(sheet.region_by_id(2).unwrap(), Rect::new(0, 16, 16, 32));
        assert_eq!(sheet.region_by_name("jump").unwrap(), Rect::new(0, 16, 16, 32));
    }

    #[test]
    fn test_load_sheet_registers_backing_image() {
        let dir = TempDir::new().unwrap();
        let (backend, resources, _sheets) = loaded_registry(&dir);

        let image = resources.get_image("atlas.png").unwrap();
        assert_eq!((image.width, image.height), (64, 64));
        assert_eq!(backend.texture_count(), 1);
    }

    #[test]
    fn test_unknown_region_lookups_fail() {
        let dir = TempDir::new().unwrap();
        let (_backend, _resources, sheets) = loaded_registry(&dir);
        let sheet = sheets.get("atlas").unwrap();

        assert!(matches!(
            sheet.region_by_id(99),
            Err(ResourceError::NotFound { .. })
        ));
        assert!(matches!(
            sheet.region_by_name("swim"),
            Err(ResourceError::NotFound { .. })
        ));
    }

    #[test]
    fn test_unknown_sheet_lookup_fails() {
        let sheets = SheetRegistry::new();
        assert!(matches!(
            sheets.get("nothing"),
            Err(ResourceError::NotFound { .. })
        ));
    }

    #[test]
    fn test_descriptor_accepts_any_whitespace() {
        let parsed =
            parse_descriptor("sheet.png\t1\r\n  7   slash   1 2 3 4  ").unwrap();
        assert_eq!(parsed.image, "sheet.png");
        assert_eq!(parsed.regions.len(), 1);
        assert_eq!(parsed.regions[0].id, 7);
        assert_eq!(parsed.regions[0].name, "slash");
        assert_eq!(parsed.regions[0].rect, Rect::new(1, 2, 3, 4));
    }

    #[test]
    fn test_truncated_descriptor_errors() {
        let result = parse_descriptor("sheet.png 2 0 idle 0 0 16 16 1 run 16 0");
        assert!(matches!(result, Err(ResourceError::Descriptor(_))));
    }

    #[test]
    fn test_non_numeric_field_errors() {
        let result = parse_descriptor("sheet.png 1 0 idle 0 zero 16 16");
        assert!(matches!(result, Err(ResourceError::Descriptor(_))));

        let empty = parse_descriptor("   ");
        assert!(matches!(empty, Err(ResourceError::Descriptor(_))));
    }

    #[test]
    fn test_load_sheet_with_missing_image_registers_nothing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("broken.txt"), "missing.png 0").unwrap();
        let mut backend = HeadlessBackend::new();
        let mut resources = ResourceStore::new();
        resources.set_base_dir(dir.path());
        let mut sheets = SheetRegistry::new();

        let result = sheets.load_sheet(&mut backend, &mut resources, "broken", "broken.txt");
        assert!(matches!(result, Err(ResourceError::Io(_))));
        assert_eq!(sheets.sheet_count(), 0);
        assert!(sheets.get("broken").is_err());
    }

    #[test]
    fn test_derived_sheet_keeps_geometry_changes_image() {
        let dir = TempDir::new().unwrap();
        let (mut backend, mut resources, mut sheets) = loaded_registry(&dir);

        sheets
            .derive_white(&mut backend, &mut resources, "atlas-white", "atlas")
            .unwrap();

        let source = sheets.get("atlas").unwrap();
        let derived = sheets.get("atlas-white").unwrap();

        // Region sequence is identical: ids, names, rectangles.
        assert_eq!(derived.regions(), source.regions());

        // Backing images are distinct store entries with distinct textures.
        assert_eq!(derived.image(), "atlas-white");
        let source_image = resources.get_image(source.image()).unwrap();
        let derived_image = resources.get_image(derived.image()).unwrap();
        assert_ne!(source_image.texture, derived_image.texture);

        // The derived image went through the white recolor before upload.
        let (uploaded, pixels) = backend.last_upload().unwrap();
        assert_eq!(uploaded, derived_image.texture);
        assert!(pixels.chunks_exact(4).all(|px| px == [255, 255, 255, 255]));
    }

    #[test]
    fn test_derive_white_from_unknown_source_fails() {
        let mut backend = HeadlessBackend::new();
        let mut resources = ResourceStore::new();
        let mut sheets = SheetRegistry::new();

        let result = sheets.derive_white(&mut backend, &mut resources, "white", "ghost");
        assert!(matches!(result, Err(ResourceError::NotFound { .. })));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "duplicate region id")]
    fn test_duplicate_region_id_panics_in_debug() {
        let regions = vec![
            SpriteRegion {
                id: 1,
                name: "a".into(),
                rect: Rect::new(0, 0, 8, 8),
            },
            SpriteRegion {
                id: 1,
                name: "b".into(),
                rect: Rect::new(8, 0, 8, 8),
            },
        ];
        let _ = SpriteSheet::from_regions("sheet", "sheet.png", regions, (16, 16));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "exceeds the 16x16 backing image")]
    fn test_out_of_bounds_region_panics_in_debug() {
        let regions = vec![SpriteRegion {
            id: 0,
            name: "huge".into(),
            rect: Rect::new(8, 8, 16, 16),
        }];
        let _ = SpriteSheet::from_regions("sheet", "sheet.png", regions, (16, 16));
    }
}
