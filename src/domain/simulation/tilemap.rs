//! Tiled JSON loading.
//!
//! Only the orthogonal, finite, CSV-array flavour is understood. Every layer
//! whose name matches a [`GroupId`] becomes that group; other visible layers
//! are kept as non-interactive backdrop. Coordinates are converted to a
//! bottom-left origin with y pointing up and multiplied by the level's tile
//! scaling.

use bevy::prelude::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::scene::{AtlasCell, Backdrop, GroupId, Scene, TextureRef};

/// The top four bits of a gid are flip and rotation flags.
const GID_MASK: u32 = 0x0FFF_FFFF;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed tile map {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("tile map {map} has no layer named \"{layer}\"")]
    MissingGroup { map: String, layer: &'static str },
    #[error("tile map {map} uses an unsupported feature: {feature}")]
    Unsupported { map: String, feature: String },
    #[error("tile map {map} references unknown tile gid {gid}")]
    UnknownTile { map: String, gid: u32 },
}

fn yes() -> bool {
    true
}

#[derive(Deserialize, Debug)]
struct TiledMap {
    width: u32,
    height: u32,
    tilewidth: u32,
    tileheight: u32,
    #[serde(default)]
    orientation: Option<String>,
    #[serde(default)]
    infinite: bool,
    #[serde(default)]
    layers: Vec<TiledLayer>,
    #[serde(default)]
    tilesets: Vec<TilesetRef>,
}

#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "lowercase")]
enum TiledLayer {
    Tilelayer {
        name: String,
        width: u32,
        #[serde(default)]
        data: Vec<u32>,
        #[serde(default = "yes")]
        visible: bool,
    },
    Objectgroup {
        name: String,
        #[serde(default)]
        objects: Vec<TiledObject>,
        #[serde(default = "yes")]
        visible: bool,
    },
    Group {
        #[serde(default)]
        layers: Vec<TiledLayer>,
        #[serde(default = "yes")]
        visible: bool,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize, Debug)]
struct TiledObject {
    #[serde(default)]
    gid: Option<u32>,
    x: f32,
    y: f32,
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
    #[serde(default = "yes")]
    visible: bool,
}

#[derive(Deserialize, Debug)]
struct TilesetRef {
    firstgid: u32,
    #[serde(default)]
    source: Option<String>,
    #[serde(flatten)]
    inline: Option<Tileset>,
}

#[derive(Deserialize, Debug, Clone)]
struct Tileset {
    tilewidth: u32,
    tileheight: u32,
    #[serde(default)]
    columns: u32,
    #[serde(default)]
    tilecount: u32,
    #[serde(default)]
    margin: u32,
    #[serde(default)]
    spacing: u32,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    tiles: Vec<TileImage>,
}

#[derive(Deserialize, Debug, Clone)]
struct TileImage {
    id: u32,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    imagewidth: u32,
    #[serde(default)]
    imageheight: u32,
}

struct ResolvedTileset {
    firstgid: u32,
    /// Directory of the file the tileset was declared in, asset-relative.
    base_dir: String,
    tileset: Tileset,
}

/// Joins an asset-relative directory with a relative path, folding `.` and
/// `..` components so the result stays asset-relative.
pub fn join_asset_path(base_dir: &str, rel: &str) -> String {
    let mut parts: Vec<&str> = base_dir.split('/').filter(|p| !p.is_empty()).collect();
    for part in rel.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            p => parts.push(p),
        }
    }
    parts.join("/")
}

fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Reads and parses a map stored under `assets_dir`.
pub fn load_scene(assets_dir: &Path, map_path: &str, scaling: f32) -> Result<Scene, MapError> {
    let read = |rel: &str| -> Result<String, MapError> {
        let path = assets_dir.join(rel);
        std::fs::read_to_string(&path).map_err(|source| MapError::Io { path, source })
    };
    let json = read(map_path)?;
    parse_scene(&json, map_path, scaling, read)
}

/// Parses map JSON. `read_external` loads external tilesets by
/// asset-relative path.
pub fn parse_scene(
    json: &str,
    map_path: &str,
    scaling: f32,
    read_external: impl Fn(&str) -> Result<String, MapError>,
) -> Result<Scene, MapError> {
    let map: TiledMap = serde_json::from_str(json).map_err(|source| MapError::Json {
        path: map_path.to_string(),
        source,
    })?;

    let unsupported = |feature: &str| MapError::Unsupported {
        map: map_path.to_string(),
        feature: feature.to_string(),
    };
    if map.infinite {
        return Err(unsupported("infinite maps"));
    }
    if let Some(o) = map.orientation.as_deref() {
        if o != "orthogonal" {
            return Err(unsupported(&format!("{o} orientation")));
        }
    }

    let mut tilesets = Vec::with_capacity(map.tilesets.len());
    for ts in &map.tilesets {
        let resolved = match (&ts.source, &ts.inline) {
            (Some(source), _) => {
                if !(source.ends_with(".json") || source.ends_with(".tsj")) {
                    return Err(unsupported(&format!("external tileset {source}")));
                }
                let path = join_asset_path(parent_dir(map_path), source);
                let text = read_external(&path)?;
                let tileset: Tileset =
                    serde_json::from_str(&text).map_err(|source| MapError::Json {
                        path: path.clone(),
                        source,
                    })?;
                ResolvedTileset {
                    firstgid: ts.firstgid,
                    base_dir: parent_dir(&path).to_string(),
                    tileset,
                }
            }
            (None, Some(tileset)) => ResolvedTileset {
                firstgid: ts.firstgid,
                base_dir: parent_dir(map_path).to_string(),
                tileset: tileset.clone(),
            },
            (None, None) => return Err(unsupported("tileset without data")),
        };
        tilesets.push(resolved);
    }
    tilesets.sort_by_key(|t| t.firstgid);

    let mut builder = Builder {
        map_path,
        scaling,
        tile_size: Vec2::new(map.tilewidth as f32, map.tileheight as f32),
        map_height_px: (map.height * map.tileheight) as f32,
        tilesets,
        scene: Scene::new(Vec2::new(
            (map.width * map.tilewidth) as f32 * scaling,
            (map.height * map.tileheight) as f32 * scaling,
        )),
        depth: 0.0,
    };
    for layer in &map.layers {
        builder.add_layer(layer, true)?;
    }
    Ok(builder.scene)
}

struct Builder<'a> {
    map_path: &'a str,
    scaling: f32,
    tile_size: Vec2,
    map_height_px: f32,
    tilesets: Vec<ResolvedTileset>,
    scene: Scene,
    depth: f32,
}

impl Builder<'_> {
    fn add_layer(&mut self, layer: &TiledLayer, parent_visible: bool) -> Result<(), MapError> {
        match layer {
            TiledLayer::Tilelayer {
                name,
                width,
                data,
                visible,
            } => {
                let Some(slot) = self.slot(name, parent_visible && *visible) else {
                    return Ok(());
                };
                let width = (*width).max(1);
                for (i, raw) in data.iter().enumerate() {
                    let gid = raw & GID_MASK;
                    if gid == 0 {
                        continue;
                    }
                    let col = i as u32 % width;
                    let row = i as u32 / width;
                    let (texture, size) = self.resolve(gid)?;
                    let centre = Vec2::new(
                        (col as f32 + 0.5) * self.tile_size.x,
                        self.map_height_px - (row as f32 + 0.5) * self.tile_size.y,
                    );
                    self.push(slot, centre, size, Some(texture), true);
                }
                self.depth += 1.0;
            }
            TiledLayer::Objectgroup {
                name,
                objects,
                visible,
            } => {
                let Some(slot) = self.slot(name, parent_visible && *visible) else {
                    return Ok(());
                };
                for obj in objects {
                    let (texture, size, centre_down) = match obj.gid {
                        // Tile objects are anchored at their bottom-left corner.
                        Some(raw) => {
                            let (texture, tex_size) = self.resolve(raw & GID_MASK)?;
                            let size = Vec2::new(
                                if obj.width > 0.0 { obj.width } else { tex_size.x },
                                if obj.height > 0.0 { obj.height } else { tex_size.y },
                            );
                            (Some(texture), size, obj.y - size.y * 0.5)
                        }
                        None => {
                            let size = Vec2::new(obj.width.max(1.0), obj.height.max(1.0));
                            (None, size, obj.y + size.y * 0.5)
                        }
                    };
                    let centre = Vec2::new(obj.x + size.x * 0.5, self.map_height_px - centre_down);
                    self.push(slot, centre, size, texture, obj.visible);
                }
                self.depth += 1.0;
            }
            TiledLayer::Group { layers, visible } => {
                for child in layers {
                    self.add_layer(child, parent_visible && *visible)?;
                }
            }
            TiledLayer::Other => {}
        }
        Ok(())
    }

    /// Where a layer's entities go. Unknown hidden layers are dropped.
    fn slot(&mut self, name: &str, visible: bool) -> Option<Slot> {
        match GroupId::from_layer_name(name) {
            Some(group) => {
                let depth = self.depth;
                let g = self.scene.ensure_group(group);
                g.visible = visible;
                g.depth = depth;
                Some(Slot::Group(group))
            }
            None if visible => Some(Slot::Backdrop),
            None => {
                debug!("{}: skipping hidden layer {name}", self.map_path);
                None
            }
        }
    }

    fn push(
        &mut self,
        slot: Slot,
        centre_px: Vec2,
        size_px: Vec2,
        texture: Option<TextureRef>,
        visible: bool,
    ) {
        let pos = centre_px * self.scaling;
        let half = size_px * self.scaling * 0.5;
        match slot {
            Slot::Group(group) => {
                let id = self.scene.spawn(group, pos, half, texture);
                if let Some(e) = self.scene.entity_mut(group, id) {
                    e.visible = visible;
                }
            }
            Slot::Backdrop if visible => self.scene.backdrop.push(Backdrop {
                pos,
                half_size: half,
                depth: self.depth,
                texture,
            }),
            Slot::Backdrop => {}
        }
    }

    fn resolve(&self, gid: u32) -> Result<(TextureRef, Vec2), MapError> {
        let unknown = || MapError::UnknownTile {
            map: self.map_path.to_string(),
            gid,
        };
        let ts = self
            .tilesets
            .iter()
            .rev()
            .find(|t| t.firstgid <= gid)
            .ok_or_else(unknown)?;
        let local = gid - ts.firstgid;
        let tileset = &ts.tileset;

        if let Some(image) = &tileset.image {
            let columns = tileset.columns.max(1);
            let count = if tileset.tilecount > 0 {
                tileset.tilecount
            } else {
                columns
            };
            if local >= count {
                return Err(unknown());
            }
            let texture = TextureRef {
                image: join_asset_path(&ts.base_dir, image),
                atlas: Some(AtlasCell {
                    tile_size: UVec2::new(tileset.tilewidth, tileset.tileheight),
                    columns,
                    rows: count.div_ceil(columns),
                    spacing: tileset.spacing,
                    margin: tileset.margin,
                    index: local,
                }),
            };
            return Ok((
                texture,
                Vec2::new(tileset.tilewidth as f32, tileset.tileheight as f32),
            ));
        }

        let tile = tileset.tiles.iter().find(|t| t.id == local).ok_or_else(unknown)?;
        let image = tile.image.as_deref().ok_or_else(unknown)?;
        Ok((
            TextureRef::image(join_asset_path(&ts.base_dir, image)),
            Vec2::new(tile.imagewidth as f32, tile.imageheight as f32),
        ))
    }
}

#[derive(Clone, Copy)]
enum Slot {
    Group(GroupId),
    Backdrop,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: &str = r#"{
        "width": 4, "height": 3, "tilewidth": 16, "tileheight": 16,
        "orientation": "orthogonal", "infinite": false,
        "tilesets": [{
            "firstgid": 1, "tilewidth": 16, "tileheight": 16,
            "columns": 2, "tilecount": 4, "image": "../raw/tiles.png"
        }],
        "layers": [
            {"type": "tilelayer", "name": "ground", "width": 4, "height": 3,
             "data": [1,1,1,1, 1,1,1,1, 1,1,1,1]},
            {"type": "tilelayer", "name": "tool", "width": 4, "height": 3,
             "data": [0,0,0,0, 0,3,0,0, 0,0,0,0], "visible": false},
            {"type": "objectgroup", "name": "destination",
             "objects": [{"x": 32, "y": 0, "width": 16, "height": 16}]},
            {"type": "imagelayer", "name": "sky"}
        ]
    }"#;

    fn no_external(path: &str) -> Result<String, MapError> {
        Err(MapError::Io {
            path: PathBuf::from(path),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })
    }

    #[test]
    fn tiles_are_placed_bottom_up_and_scaled() {
        let scene = parse_scene(MAP, "maps/city/City.json", 2.0, no_external).unwrap();
        assert_eq!(scene.size, Vec2::new(128.0, 96.0));

        let tool = scene.entities(GroupId::Tool);
        assert_eq!(tool.len(), 1);
        // column 1, row 1 of a 3-row map: centre (24, 24) before scaling
        assert_eq!(tool[0].pos, Vec2::new(48.0, 48.0));
        assert_eq!(tool[0].half_size, Vec2::splat(16.0));
        assert!(!scene.is_visible(GroupId::Tool));

        let texture = tool[0].texture.as_ref().unwrap();
        assert_eq!(texture.image, "maps/raw/tiles.png");
        assert_eq!(texture.atlas.as_ref().unwrap().index, 2);
        assert_eq!(texture.atlas.as_ref().unwrap().rows, 2);
    }

    #[test]
    fn unknown_layers_become_backdrop() {
        let scene = parse_scene(MAP, "maps/city/City.json", 1.0, no_external).unwrap();
        assert_eq!(scene.backdrop.len(), 12);
        assert!(scene.backdrop.iter().all(|b| b.depth == 0.0));
    }

    #[test]
    fn rectangle_objects_convert_from_top_left() {
        let scene = parse_scene(MAP, "maps/city/City.json", 1.0, no_external).unwrap();
        let dest = scene.entities(GroupId::Destination);
        assert_eq!(dest.len(), 1);
        assert_eq!(dest[0].pos, Vec2::new(40.0, 40.0));
        assert!(dest[0].texture.is_none());
    }

    #[test]
    fn external_tilesets_are_read_relative_to_the_map() {
        let json = r#"{
            "width": 1, "height": 1, "tilewidth": 8, "tileheight": 8,
            "tilesets": [{"firstgid": 1, "source": "dogs.tsj"}],
            "layers": [{"type": "tilelayer", "name": "angry-dogs", "width": 1, "data": [2]}]
        }"#;
        let read = |path: &str| -> Result<String, MapError> {
            assert_eq!(path, "maps/forest/dogs.tsj");
            Ok(r#"{"tilewidth": 8, "tileheight": 8, "tiles": [
                {"id": 1, "image": "dog.png", "imagewidth": 12, "imageheight": 10}
            ]}"#
            .to_string())
        };
        let scene = parse_scene(json, "maps/forest/test-map.json", 1.0, read).unwrap();
        let dog = &scene.entities(GroupId::AngryDogs)[0];
        assert_eq!(dog.texture.as_ref().unwrap().image, "maps/forest/dog.png");
        assert_eq!(dog.half_size, Vec2::new(6.0, 5.0));
    }

    #[test]
    fn bad_input_fails_fast() {
        assert!(matches!(
            parse_scene("{", "broken.json", 1.0, no_external),
            Err(MapError::Json { .. })
        ));

        let infinite = r#"{"width": 1, "height": 1, "tilewidth": 8, "tileheight": 8, "infinite": true}"#;
        assert!(matches!(
            parse_scene(infinite, "inf.json", 1.0, no_external),
            Err(MapError::Unsupported { .. })
        ));

        let dangling = r#"{"width": 1, "height": 1, "tilewidth": 8, "tileheight": 8,
            "layers": [{"type": "tilelayer", "name": "tool", "width": 1, "data": [7]}]}"#;
        assert!(matches!(
            parse_scene(dangling, "dangling.json", 1.0, no_external),
            Err(MapError::UnknownTile { gid: 7, .. })
        ));
    }

    #[test]
    fn flag_bits_are_stripped_from_tile_ids() {
        // 0x1000_0003 and 0x8000_0003: gid 3 rotated (hexagonal) and flipped.
        let json = r#"{
            "width": 2, "height": 1, "tilewidth": 16, "tileheight": 16,
            "tilesets": [{
                "firstgid": 1, "tilewidth": 16, "tileheight": 16,
                "columns": 2, "tilecount": 4, "image": "tiles.png"
            }],
            "layers": [{"type": "tilelayer", "name": "tool", "width": 2,
                        "data": [268435459, 2147483651]}]
        }"#;
        let scene = parse_scene(json, "maps/city/City.json", 1.0, no_external).unwrap();
        let tool = scene.entities(GroupId::Tool);
        assert_eq!(tool.len(), 2);
        for tile in tool {
            assert_eq!(tile.texture.as_ref().unwrap().atlas.as_ref().unwrap().index, 2);
        }
    }

    #[test]
    fn asset_paths_fold_parent_components() {
        assert_eq!(join_asset_path("maps/city", "../raw/a.png"), "maps/raw/a.png");
        assert_eq!(join_asset_path("", "./a.png"), "a.png");
        assert_eq!(join_asset_path("maps", "../../a.png"), "a.png");
    }
}
