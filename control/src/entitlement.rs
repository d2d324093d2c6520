//! Entitlement check (C8, spec.md §4.8): the caller's allowed asset classes, instruments, and
//! venues must cover the command's target. An empty set means "unrestricted" in that dimension.

#[derive(Debug, Clone, Default)]
pub struct Entitlement {
    pub asset_classes: Vec<String>,
    pub instruments: Vec<String>,
    pub venues: Vec<String>,
}

impl Entitlement {
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn covers(&self, asset_class: &str, instrument_id: &str, venue: Option<&str>) -> bool {
        let asset_ok = self.asset_classes.is_empty() || self.asset_classes.iter().any(|a| a == asset_class);
        let instrument_ok = self.instruments.is_empty() || self.instruments.iter().any(|i| i == instrument_id);
        let venue_ok = match venue {
            Some(v) => self.venues.is_empty() || self.venues.iter().any(|allowed| allowed == v),
            None => true,
        };
        asset_ok && instrument_ok && venue_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_entitlement_is_unrestricted() {
        let ent = Entitlement::unrestricted();
        assert!(ent.covers("fx_spot", "EURUSD", Some("venue-1")));
    }

    #[test]
    fn restricted_instrument_set_blocks_others() {
        let ent = Entitlement {
            asset_classes: vec![],
            instruments: vec!["EURUSD".to_string()],
            venues: vec![],
        };
        assert!(ent.covers("fx_spot", "EURUSD", None));
        assert!(!ent.covers("fx_spot", "GBPUSD", None));
    }
}
