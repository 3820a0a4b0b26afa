//! Zones (component E) and the object arena (§9: "arena + opaque
//! object-id indices"). `ZoneManager` owns every [`GameObject`] for the
//! whole game; all cross-references elsewhere are plain [`ObjectId`]s
//! resolved back through here, so cyclic references (attachments,
//! controllers, trigger sources) never need to be expressed as Rust
//! ownership cycles.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::event::{Event, EventBus};
use crate::ids::{ObjectId, PlayerId};
use crate::object::GameObject;
use crate::types::Zone;

#[derive(Debug, Clone, Default)]
pub struct ZoneManager {
    objects: HashMap<ObjectId, GameObject>,
    zone_of: HashMap<ObjectId, Zone>,
    libraries: HashMap<PlayerId, Vec<ObjectId>>,
    hands: HashMap<PlayerId, Vec<ObjectId>>,
    battlefield: Vec<ObjectId>,
    graveyards: HashMap<PlayerId, Vec<ObjectId>>,
    stack: Vec<ObjectId>,
    exile: Vec<ObjectId>,
    command: Vec<ObjectId>,
}

impl ZoneManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(&id)
    }

    pub fn zone_of(&self, id: ObjectId) -> Option<Zone> {
        self.zone_of.get(&id).copied()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    fn bucket(&mut self, zone: Zone, owner: PlayerId) -> &mut Vec<ObjectId> {
        match zone {
            Zone::Library => self.libraries.entry(owner).or_default(),
            Zone::Hand => self.hands.entry(owner).or_default(),
            Zone::Battlefield => &mut self.battlefield,
            Zone::Graveyard => self.graveyards.entry(owner).or_default(),
            Zone::Stack => &mut self.stack,
            Zone::Exile => &mut self.exile,
            Zone::Command => &mut self.command,
        }
    }

    fn bucket_ref(&self, zone: Zone, owner: PlayerId) -> Option<&Vec<ObjectId>> {
        match zone {
            Zone::Library => self.libraries.get(&owner),
            Zone::Hand => self.hands.get(&owner),
            Zone::Battlefield => Some(&self.battlefield),
            Zone::Graveyard => self.graveyards.get(&owner),
            Zone::Stack => Some(&self.stack),
            Zone::Exile => Some(&self.exile),
            Zone::Command => Some(&self.command),
        }
    }

    /// Objects currently in `zone` owned by `owner` (ignored for shared
    /// zones), in zone order.
    pub fn objects_in(&self, zone: Zone, owner: PlayerId) -> &[ObjectId] {
        self.bucket_ref(zone, owner).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn library_size(&self, owner: PlayerId) -> usize {
        self.libraries.get(&owner).map(|v| v.len()).unwrap_or(0)
    }

    /// Top of a player's library (the end of the vec = next card drawn).
    pub fn library_top(&self, owner: PlayerId) -> Option<ObjectId> {
        self.libraries.get(&owner).and_then(|v| v.last().copied())
    }

    pub fn stack_top(&self) -> Option<ObjectId> {
        self.stack.last().copied()
    }

    pub fn stack_is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn stack_order(&self) -> &[ObjectId] {
        &self.stack
    }

    pub fn battlefield(&self) -> &[ObjectId] {
        &self.battlefield
    }

    /// Inserts a brand-new object directly into a zone (initial library
    /// population, token creation already-on-battlefield, etc). Does not
    /// emit a zone-change event since there is no "from" zone.
    pub fn insert_new(&mut self, object: GameObject, zone: Zone) {
        let id = object.object_id;
        let owner = object.owner_id;
        self.objects.insert(id, object);
        self.zone_of.insert(id, zone);
        self.bucket(zone, owner).push(id);
    }

    /// Moves an object to a new zone as a single atomic step, emitting a
    /// zone-change event (§3 Zone invariant). Returns the previous zone.
    pub fn move_object(&mut self, id: ObjectId, to: Zone, bus: &mut EventBus) -> Option<Zone> {
        let from = self.zone_of.get(&id).copied()?;
        let owner = self.objects.get(&id)?.owner_id;
        let from_bucket = self.bucket(from, owner);
        if let Some(pos) = from_bucket.iter().position(|&x| x == id) {
            from_bucket.remove(pos);
        }
        self.bucket(to, owner).push(id);
        self.zone_of.insert(id, to);
        bus.publish(Event::ZoneChange { object: id, from, to });
        if to == Zone::Battlefield {
            let controller = self.objects.get(&id).map(|o| o.controller());
            if let Some(controller) = controller {
                bus.publish(Event::EntersBattlefield { object: id, controller });
            }
        }
        if from == Zone::Battlefield {
            bus.publish(Event::LeavesBattlefield { object: id, from });
        }
        Some(from)
    }

    /// Shuffles a player's library (CR 103.2, and after any mulligan).
    pub fn shuffle_library(&mut self, owner: PlayerId, rng: &mut impl Rng) {
        if let Some(lib) = self.libraries.get_mut(&owner) {
            lib.shuffle(rng);
        }
    }

    /// Moves an object to the bottom of its owner's library (CR 103.5's
    /// mulligan bottoming), as opposed to [`Self::move_object`], which always
    /// places an incoming object on top.
    pub fn move_to_library_bottom(&mut self, id: ObjectId, bus: &mut EventBus) -> Option<Zone> {
        let from = self.zone_of.get(&id).copied()?;
        let owner = self.objects.get(&id)?.owner_id;
        let from_bucket = self.bucket(from, owner);
        if let Some(pos) = from_bucket.iter().position(|&x| x == id) {
            from_bucket.remove(pos);
        }
        self.bucket(Zone::Library, owner).insert(0, id);
        self.zone_of.insert(id, Zone::Library);
        bus.publish(Event::ZoneChange { object: id, from, to: Zone::Library });
        if from == Zone::Battlefield {
            bus.publish(Event::LeavesBattlefield { object: id, from });
        }
        Some(from)
    }

    /// Removes an object from the game entirely (ceasing to exist, as
    /// happens to tokens leaving the battlefield, I7).
    pub fn remove(&mut self, id: ObjectId) {
        if let Some(zone) = self.zone_of.remove(&id) {
            if let Some(obj) = self.objects.get(&id) {
                let owner = obj.owner_id;
                let bucket = self.bucket(zone, owner);
                if let Some(pos) = bucket.iter().position(|&x| x == id) {
                    bucket.remove(pos);
                }
            }
        }
        self.objects.remove(&id);
    }

    pub fn all_object_ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.keys().copied()
    }
}
