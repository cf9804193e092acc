use std::sync::Arc;

use crate::dns_query::canonical_name;

/// Authoritative zones in registration order.
#[derive(Debug, Clone, Default)]
pub struct ZoneSet {
    zones: Vec<Arc<str>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneMatch<'a> {
    pub zone: Arc<str>,
    /// The name with the zone removed, without trailing dot. Empty for the apex.
    pub relative: &'a str,
}

impl ZoneSet {
    pub fn new<I, S>(zones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            zones: zones
                .into_iter()
                .map(|z| Arc::from(canonical_name(z.as_ref())))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.zones.iter().map(|z| z.as_ref())
    }

    /// Most specific zone containing `name`. Equal lengths keep the zone
    /// registered first. `name` must already be canonical.
    pub fn match_name<'a>(&self, name: &'a str) -> Option<ZoneMatch<'a>> {
        let mut best: Option<ZoneMatch<'a>> = None;

        for zone in &self.zones {
            let Some(relative) = strip_zone(name, zone) else {
                continue;
            };
            let better = best
                .as_ref()
                .map_or(true, |current| zone.len() > current.zone.len());
            if better {
                best = Some(ZoneMatch {
                    zone: zone.clone(),
                    relative,
                });
            }
        }

        best
    }
}

fn strip_zone<'a>(name: &'a str, zone: &str) -> Option<&'a str> {
    if zone == "." {
        return Some(name.strip_suffix('.').unwrap_or(name));
    }
    if name == zone {
        return Some("");
    }
    name.strip_suffix(zone)?.strip_suffix('.')
}
