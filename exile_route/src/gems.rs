//! Gem acquisition queue.
//!
//! The imported build lists the gems a character needs. As quests complete
//! during route resolution, each reward offer is checked against the queue
//! and matching gems become [`GemStep`]s placed right after the step that
//! unlocked them. A gem is placed at most once, keyed by its canonical id so
//! vaal and awakened variants collapse onto the base gem.

use std::collections::BTreeSet;

use log::debug;

use exile_data::{CharacterClass, GemDef, GemStep, Id, QuestDef, ReferenceData, RequiredGem, RewardType};

use crate::error::RouteErrorKind;

#[derive(Debug, Clone, PartialEq, Eq)]
struct QueuedGem {
    required: RequiredGem,
    canonical_id: Id,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GemQueue {
    enabled: bool,
    class: Option<CharacterClass>,
    pending: Vec<QueuedGem>,
    placed: BTreeSet<Id>,
    /// `(quest id, reward offer id)` pairs unlocked so far, in route order.
    unlocked: Vec<(Id, Id)>,
    ready: Vec<GemStep>,
}

impl GemQueue {
    /// A queue that never emits gem steps, used by the voidstone routes.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Queue the build's gems in order. Duplicates (after vaal/awakened
    /// remapping) keep their first entry.
    ///
    /// # Errors
    /// Returns [`RouteErrorKind::UnknownGem`] if a gem id is not in the
    /// reference data.
    pub fn new(
        class: Option<CharacterClass>,
        required: &[RequiredGem],
        reference: &ReferenceData,
    ) -> Result<Self, RouteErrorKind> {
        let mut pending: Vec<QueuedGem> = Vec::with_capacity(required.len());
        for gem in required {
            if reference.gem(&gem.id).is_none() {
                return Err(RouteErrorKind::UnknownGem(gem.id.clone()));
            }
            let canonical_id = reference.canonical_gem_id(&gem.id).to_string();
            if pending.iter().any(|q| q.canonical_id == canonical_id) {
                debug!("gem '{}' already queued as '{}'", gem.id, canonical_id);
                continue;
            }
            pending.push(QueuedGem {
                required: gem.clone(),
                canonical_id,
            });
        }
        Ok(Self {
            enabled: true,
            class,
            pending,
            placed: BTreeSet::new(),
            unlocked: Vec::new(),
            ready: Vec::new(),
        })
    }

    /// Build gems not yet placed anywhere in the route.
    pub fn pending(&self) -> impl Iterator<Item = &RequiredGem> {
        self.pending.iter().map(|q| &q.required)
    }

    /// Whether a gem step for this canonical id was already emitted.
    pub fn is_placed(&self, canonical_id: &str) -> bool {
        self.placed.contains(canonical_id)
    }

    /// Offer the rewards of a just-completed quest to the queue.
    ///
    /// For each offer the first queued gem its quest table hands to the class
    /// is taken as the quest reward; every other queued gem the offer's vendor
    /// sells is bought.
    pub(crate) fn unlock_offers(&mut self, quest: &QuestDef, offer_ids: &[Id], reference: &ReferenceData) {
        if !self.enabled {
            return;
        }
        for offer_id in offer_ids {
            let Some(offer) = quest.reward_offers.get(offer_id) else {
                continue;
            };
            self.unlocked.push((quest.id.clone(), offer_id.clone()));
            let class = self.class;
            if let Some(pos) = self
                .pending
                .iter()
                .position(|q| offer.offers(&q.canonical_id, class, RewardType::Quest))
            {
                let queued = self.pending.remove(pos);
                self.place(queued, RewardType::Quest, reference);
            }
            let (bought, rest): (Vec<QueuedGem>, Vec<QueuedGem>) = std::mem::take(&mut self.pending)
                .into_iter()
                .partition(|q| offer.offers(&q.canonical_id, class, RewardType::Vendor));
            self.pending = rest;
            for queued in bought {
                self.place(queued, RewardType::Vendor, reference);
            }
        }
    }

    /// A reward the route itself tells the player to take.
    ///
    /// The gem is placed only when a reward offer unlocked earlier in the
    /// route provides it to the class, preferring the channel the tag names.
    /// Otherwise it stays queued (as a candidate if the build did not list
    /// it) until a later quest unlocks it.
    pub(crate) fn note_route_reward(&mut self, gem: &GemDef, named: RewardType, reference: &ReferenceData) {
        if !self.enabled {
            return;
        }
        let canonical_id = reference.canonical_gem_id(&gem.id).to_string();
        if self.is_placed(&canonical_id) {
            return;
        }
        let queued = match self.pending.iter().position(|q| q.canonical_id == canonical_id) {
            Some(pos) => self.pending.remove(pos),
            None => QueuedGem {
                required: RequiredGem::new(gem.id.clone()),
                canonical_id,
            },
        };
        match self.unlocked_channel(&queued.canonical_id, named, reference) {
            Some(reward_type) => self.place(queued, reward_type, reference),
            None => {
                debug!("gem '{}' is not offered yet, keeping it queued", queued.required.id);
                self.pending.push(queued);
            },
        }
    }

    /// The channel through which an already unlocked offer provides the gem
    /// to the class, trying `preferred` first.
    fn unlocked_channel(&self, canonical_id: &str, preferred: RewardType, reference: &ReferenceData) -> Option<RewardType> {
        let other = match preferred {
            RewardType::Quest => RewardType::Vendor,
            RewardType::Vendor => RewardType::Quest,
        };
        [preferred, other].into_iter().find(|&channel| {
            self.unlocked.iter().any(|(quest_id, offer_id)| {
                reference
                    .quest(quest_id)
                    .and_then(|q| q.reward_offers.get(offer_id))
                    .is_some_and(|offer| offer.offers(canonical_id, self.class, channel))
            })
        })
    }

    fn place(&mut self, queued: QueuedGem, reward_type: RewardType, reference: &ReferenceData) {
        if self.is_placed(&queued.canonical_id) {
            return;
        }
        self.placed.insert(queued.canonical_id);
        debug!("placing gem '{}' as {reward_type:?} reward", queued.required.id);
        self.ready.push(GemStep {
            required_gem: reference.gem_ref(&queued.required, self.class),
            count: queued.required.count,
            reward_type,
        });
    }

    /// Gem steps emitted since the last call, in placement order.
    pub(crate) fn take_ready(&mut self) -> Vec<GemStep> {
        std::mem::take(&mut self.ready)
    }
}
