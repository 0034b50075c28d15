//! Anonymous peer profiles.
//!
//! A profile is an immutable value produced once per successful discovery.
//! Nothing about it identifies a real person: the avatar is an icon name and
//! the pseudonym is chosen by the peer.

use std::fmt;

use rand::{RngCore, seq::SliceRandom};

/// Identifier of a discovered peer.
///
/// Random per discovery; not stable across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(pub u64);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Anonymized profile of a nearby peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerProfile {
    /// Discovery-scoped identifier.
    pub id: PeerId,
    /// Self-chosen display name.
    pub pseudonym: String,
    /// Study year, e.g. "Junior".
    pub year: String,
    /// Field of study.
    pub major: String,
    /// Icon name; never a photo.
    pub avatar_icon: String,
    /// Things the peer is looking for support in, in display order.
    pub help_tags: Vec<String>,
    /// Short free-form bio.
    pub bio: String,
}

/// Profile fields without an identifier.
///
/// Factories hold templates and stamp a fresh [`PeerId`] onto each one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileTemplate {
    /// Self-chosen display name.
    pub pseudonym: String,
    /// Study year.
    pub year: String,
    /// Field of study.
    pub major: String,
    /// Icon name.
    pub avatar_icon: String,
    /// Support tags in display order.
    pub help_tags: Vec<String>,
    /// Short bio.
    pub bio: String,
}

impl ProfileTemplate {
    /// Stamp `id` onto a copy of this template.
    pub fn instantiate(&self, id: PeerId) -> PeerProfile {
        PeerProfile {
            id,
            pseudonym: self.pseudonym.clone(),
            year: self.year.clone(),
            major: self.major.clone(),
            avatar_icon: self.avatar_icon.clone(),
            help_tags: self.help_tags.clone(),
            bio: self.bio.clone(),
        }
    }
}

impl Default for ProfileTemplate {
    fn default() -> Self {
        Self {
            pseudonym: "NeonWalker".into(),
            year: "Junior".into(),
            major: "Digital Arts".into(),
            avatar_icon: "person.crop.circle.badge.moon".into(),
            help_tags: vec!["Safe Walk".into(), "SwiftUI Help".into(), "Coffee Chat".into()],
            bio: "Designing for the future. Love sci-fi and chai.".into(),
        }
    }
}

/// Produces the profile exposed by a successful discovery.
///
/// Substituting a real proximity transport means implementing this trait
/// over whatever the transport reports.
pub trait PeerFactory: Send {
    /// Build the profile for the peer identified by `id`.
    fn create(&mut self, id: PeerId, rng: &mut dyn RngCore) -> PeerProfile;
}

/// Any `FnMut(PeerId, &mut dyn RngCore) -> PeerProfile` is a factory.
impl<F> PeerFactory for F
where
    F: FnMut(PeerId, &mut dyn RngCore) -> PeerProfile + Send,
{
    fn create(&mut self, id: PeerId, rng: &mut dyn RngCore) -> PeerProfile {
        self(id, rng)
    }
}

/// Always produces the same profile.
#[derive(Debug, Clone, Default)]
pub struct FixedPeerFactory {
    template: ProfileTemplate,
}

impl FixedPeerFactory {
    /// Factory that always yields `template`.
    pub fn new(template: ProfileTemplate) -> Self {
        Self { template }
    }
}

impl PeerFactory for FixedPeerFactory {
    fn create(&mut self, id: PeerId, _rng: &mut dyn RngCore) -> PeerProfile {
        self.template.instantiate(id)
    }
}

/// Picks a profile uniformly at random from a catalogue.
#[derive(Debug, Clone)]
pub struct CatalogPeerFactory {
    catalog: Vec<ProfileTemplate>,
}

impl CatalogPeerFactory {
    /// Factory over `catalog`. An empty catalogue yields the default
    /// template.
    pub fn new(catalog: Vec<ProfileTemplate>) -> Self {
        Self { catalog }
    }

    /// Built-in catalogue of campus personas.
    pub fn builtin() -> Self {
        Self::new(vec![
            ProfileTemplate::default(),
            persona(
                "QuietComet",
                "Sophomore",
                "Astrophysics",
                "sparkles",
                &["Study Buddy", "Night Walk"],
                "Stargazer. Will trade lecture notes for tea.",
            ),
            persona(
                "VelvetFern",
                "Senior",
                "Botany",
                "leaf.circle",
                &["Coffee Chat", "Plant Swap", "Safe Walk"],
                "Keeps a greenhouse in a dorm room somehow.",
            ),
        ])
    }
}

fn persona(
    pseudonym: &str,
    year: &str,
    major: &str,
    icon: &str,
    tags: &[&str],
    bio: &str,
) -> ProfileTemplate {
    ProfileTemplate {
        pseudonym: pseudonym.into(),
        year: year.into(),
        major: major.into(),
        avatar_icon: icon.into(),
        help_tags: tags.iter().map(|tag| (*tag).to_string()).collect(),
        bio: bio.into(),
    }
}

impl PeerFactory for CatalogPeerFactory {
    fn create(&mut self, id: PeerId, rng: &mut dyn RngCore) -> PeerProfile {
        match self.catalog.choose(rng) {
            Some(template) => template.instantiate(id),
            None => ProfileTemplate::default().instantiate(id),
        }
    }
}
