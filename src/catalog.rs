use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::engine::{ClassSchedule, Directory, EngineError};
use crate::limits::MAX_CATALOG_ROOMS;
use crate::model::*;
use crate::schedule;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate {kind} id {id}")]
    Duplicate { kind: &'static str, id: i64 },
    #[error("room {room_id} references unknown building {building_id}")]
    UnknownBuilding { room_id: RoomId, building_id: BuildingId },
    #[error("timetable references unknown room {0}")]
    UnknownRoom(RoomId),
    #[error("timetable weekday {0} out of range 1..=7")]
    BadWeekday(u8),
    #[error("catalog has more than {} rooms", MAX_CATALOG_ROOMS)]
    TooManyRooms,
}

/// On-disk seed: buildings, rooms and the weekly timetable grid.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub buildings: Vec<Building>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub timetable: Vec<TimetableEntry>,
}

/// Read-only directory and class schedule, built once at startup.
#[derive(Debug, Default)]
pub struct Catalog {
    buildings: BTreeMap<BuildingId, Building>,
    rooms: BTreeMap<RoomId, Room>,
    /// Per room, sorted by (weekday, period).
    timetable: HashMap<RoomId, Vec<TimetableEntry>>,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let bytes = std::fs::read(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let seed: CatalogSeed = serde_json::from_slice(&bytes)?;
        let catalog = Self::from_seed(seed)?;
        info!(
            "catalog loaded from {}: {} buildings, {} rooms",
            path.display(),
            catalog.buildings.len(),
            catalog.rooms.len()
        );
        Ok(catalog)
    }

    pub fn from_seed(seed: CatalogSeed) -> Result<Self, CatalogError> {
        if seed.rooms.len() > MAX_CATALOG_ROOMS {
            return Err(CatalogError::TooManyRooms);
        }

        let mut buildings = BTreeMap::new();
        for b in seed.buildings {
            let id = b.id;
            if buildings.insert(id, b).is_some() {
                return Err(CatalogError::Duplicate { kind: "building", id });
            }
        }

        let mut rooms = BTreeMap::new();
        for r in seed.rooms {
            if !buildings.contains_key(&r.building_id) {
                return Err(CatalogError::UnknownBuilding {
                    room_id: r.id,
                    building_id: r.building_id,
                });
            }
            let id = r.id;
            if rooms.insert(id, r).is_some() {
                return Err(CatalogError::Duplicate { kind: "room", id });
            }
        }

        let mut timetable: HashMap<RoomId, Vec<TimetableEntry>> = HashMap::new();
        for entry in seed.timetable {
            if !rooms.contains_key(&entry.room_id) {
                return Err(CatalogError::UnknownRoom(entry.room_id));
            }
            if !(1..=7).contains(&entry.weekday) {
                return Err(CatalogError::BadWeekday(entry.weekday));
            }
            timetable.entry(entry.room_id).or_default().push(entry);
        }
        for entries in timetable.values_mut() {
            entries.sort_by_key(|e| (e.weekday, e.period));
        }

        Ok(Self {
            buildings,
            rooms,
            timetable,
        })
    }

    fn entries(&self, room_id: RoomId) -> &[TimetableEntry] {
        self.timetable.get(&room_id).map(Vec::as_slice).unwrap_or_default()
    }
}

#[async_trait]
impl Directory for Catalog {
    async fn list_buildings(&self) -> Result<Vec<Building>, EngineError> {
        Ok(self.buildings.values().cloned().collect())
    }

    async fn list_rooms(&self, filter: &RoomFilter) -> Result<Vec<Room>, EngineError> {
        Ok(self
            .rooms
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn room(&self, id: RoomId) -> Result<Option<Room>, EngineError> {
        Ok(self.rooms.get(&id).cloned())
    }
}

#[async_trait]
impl ClassSchedule for Catalog {
    async fn class_blocks(&self, room_id: RoomId, date: NaiveDate) -> Result<Vec<ClassBlock>, EngineError> {
        Ok(schedule::class_blocks(
            self.entries(room_id),
            schedule::weekday_number(date),
        ))
    }

    async fn raw_timetable(&self, room_id: RoomId) -> Result<Vec<TimetableEntry>, EngineError> {
        Ok(self.entries(room_id).to_vec())
    }
}
