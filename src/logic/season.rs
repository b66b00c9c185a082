use crate::models::Season;

/// Seasons active in a given calendar month.
///
/// The windows overlap: June is both Kharif and Zaid, since the monsoon
/// sowing calendar starts while summer catch crops are still in the field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveSeasons {
    pub kharif: bool,
    pub rabi: bool,
    pub zaid: bool,
}

impl ActiveSeasons {
    /// `month` is 1-indexed. Anything outside 1..=12 activates nothing.
    pub fn for_month(month: u32) -> Self {
        if !(1..=12).contains(&month) {
            return Self::default();
        }
        Self {
            kharif: (6..=10).contains(&month),
            rabi: month >= 11 || month <= 3,
            zaid: (4..=6).contains(&month),
        }
    }

    pub fn contains(&self, season: Season) -> bool {
        match season {
            Season::Kharif => self.kharif,
            Season::Rabi => self.rabi,
            Season::Zaid => self.zaid,
        }
    }

    pub fn any_of(&self, seasons: &[Season]) -> bool {
        seasons.iter().any(|s| self.contains(*s))
    }

    /// Active season among `candidates`, preferring Kharif, then Zaid, then Rabi.
    pub fn preferred(&self, candidates: &[Season]) -> Option<Season> {
        Season::PREFERENCE
            .into_iter()
            .find(|s| candidates.contains(s) && self.contains(*s))
    }

    pub fn active(&self) -> Vec<Season> {
        Season::PREFERENCE
            .into_iter()
            .filter(|s| self.contains(*s))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_month_has_a_season() {
        for month in 1..=12 {
            let active = ActiveSeasons::for_month(month);
            assert!(!active.active().is_empty(), "month {} has no season", month);
        }
    }

    #[test]
    fn june_is_kharif_and_zaid() {
        let june = ActiveSeasons::for_month(6);
        assert!(june.kharif);
        assert!(june.zaid);
        assert!(!june.rabi);
        assert_eq!(june.active(), vec![Season::Kharif, Season::Zaid]);
    }

    #[test]
    fn rabi_wraps_the_year() {
        for month in [11, 12, 1, 2, 3] {
            assert!(ActiveSeasons::for_month(month).rabi);
        }
        for month in 4..=10 {
            assert!(!ActiveSeasons::for_month(month).rabi);
        }
    }

    #[test]
    fn window_edges() {
        assert!(ActiveSeasons::for_month(10).kharif);
        assert!(!ActiveSeasons::for_month(11).kharif);
        assert!(ActiveSeasons::for_month(4).zaid);
        assert!(!ActiveSeasons::for_month(7).zaid);
        assert!(!ActiveSeasons::for_month(3).zaid);
    }

    #[test]
    fn out_of_range_month_is_inactive() {
        assert_eq!(ActiveSeasons::for_month(0), ActiveSeasons::default());
        assert_eq!(ActiveSeasons::for_month(13), ActiveSeasons::default());
    }

    #[test]
    fn preference_picks_kharif_over_zaid_over_rabi() {
        let june = ActiveSeasons::for_month(6);
        assert_eq!(
            june.preferred(&[Season::Zaid, Season::Kharif]),
            Some(Season::Kharif)
        );
        assert_eq!(june.preferred(&[Season::Zaid, Season::Rabi]), Some(Season::Zaid));
        assert_eq!(june.preferred(&[Season::Rabi]), None);

        let january = ActiveSeasons::for_month(1);
        assert_eq!(
            january.preferred(&[Season::Kharif, Season::Rabi]),
            Some(Season::Rabi)
        );
    }
}
