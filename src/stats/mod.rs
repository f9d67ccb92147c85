//! Aggregate figures and the year/month timeline over a launch list.

use crate::domain::{Launch, Outcome};
use chrono::Datelike;
use std::collections::{BTreeMap, HashMap};

const TOP_ROCKETS: usize = 5;
const RECENT_YEARS: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct LaunchStatistics {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub upcoming: usize,
    /// Whole percent of decided launches that succeeded
    pub success_rate: u32,
    /// Rocket id and launch count, busiest first
    pub top_rockets: Vec<(String, usize)>,
    /// Site-local year and launch count, newest first
    pub recent_years: Vec<(i32, usize)>,
}

impl LaunchStatistics {
    pub fn compute(launches: &[Launch]) -> Self {
        let successful = launches.iter().filter(|l| l.success == Some(true)).count();
        let failed = launches.iter().filter(|l| l.success == Some(false)).count();
        let upcoming = launches.iter().filter(|l| l.upcoming).count();
        let decided = successful + failed;
        let success_rate = if decided == 0 {
            0
        } else {
            (successful as f64 * 100.0 / decided as f64).round() as u32
        };

        // count per rocket, remembering first appearance for stable ties
        let mut rockets: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for l in launches {
            match index.get(l.rocket.as_str()) {
                Some(&i) => rockets[i].1 += 1,
                None => {
                    index.insert(l.rocket.as_str(), rockets.len());
                    rockets.push((l.rocket.clone(), 1));
                }
            }
        }
        rockets.sort_by(|a, b| b.1.cmp(&a.1));
        rockets.truncate(TOP_ROCKETS);

        let mut years: BTreeMap<i32, usize> = BTreeMap::new();
        for l in launches {
            *years.entry(l.year_local()).or_insert(0) += 1;
        }
        let recent_years = years.into_iter().rev().take(RECENT_YEARS).collect();

        Self {
            total: launches.len(),
            successful,
            failed,
            upcoming,
            success_rate,
            top_rockets: rockets,
            recent_years,
        }
    }
}

/// Launches of one year split by displayed outcome, each newest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearCategories {
    pub success: Vec<Launch>,
    pub upcoming: Vec<Launch>,
    pub failed: Vec<Launch>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineYear {
    pub year: i32,
    /// Month number (1-12) and its launches in local-time order
    pub months: Vec<(u32, Vec<Launch>)>,
}

impl TimelineYear {
    pub fn total(&self) -> usize {
        self.months.iter().map(|(_, l)| l.len()).sum()
    }

    pub fn categories(&self) -> YearCategories {
        let mut out = YearCategories::default();
        for launch in self.months.iter().flat_map(|(_, l)| l.iter()) {
            match launch.outcome() {
                Outcome::Upcoming => out.upcoming.push(launch.clone()),
                Outcome::Success => out.success.push(launch.clone()),
                Outcome::Failed => out.failed.push(launch.clone()),
                Outcome::Unknown => {}
            }
        }
        for list in [&mut out.success, &mut out.upcoming, &mut out.failed] {
            list.sort_by(|a, b| b.date_local.cmp(&a.date_local));
        }
        out
    }
}

/// Launches grouped by site-local year (newest first) and month
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    pub years: Vec<TimelineYear>,
}

impl Timeline {
    pub fn build(launches: &[Launch]) -> Self {
        let mut grouped: BTreeMap<i32, BTreeMap<u32, Vec<Launch>>> = BTreeMap::new();
        for l in launches {
            grouped
                .entry(l.year_local())
                .or_default()
                .entry(l.date_local.month())
                .or_default()
                .push(l.clone());
        }
        let years = grouped
            .into_iter()
            .rev()
            .map(|(year, months)| TimelineYear {
                year,
                months: months
                    .into_iter()
                    .map(|(month, mut list)| {
                        list.sort_by(|a, b| a.date_local.cmp(&b.date_local));
                        (month, list)
                    })
                    .collect(),
            })
            .collect();
        Self { years }
    }

    pub fn year(&self, year: i32) -> Option<&TimelineYear> {
        self.years.iter().find(|y| y.year == year)
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.years.first().map(|y| y.year)
    }

    /// The next older year with data
    pub fn previous_year(&self, year: i32) -> Option<i32> {
        let idx = self.years.iter().position(|y| y.year == year)?;
        self.years.get(idx + 1).map(|y| y.year)
    }

    /// The next newer year with data
    pub fn next_year(&self, year: i32) -> Option<i32> {
        let idx = self.years.iter().position(|y| y.year == year)?;
        idx.checked_sub(1).map(|i| self.years[i].year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::launch;

    fn fleet() -> Vec<Launch> {
        let mut upcoming = launch("u", "Crew-12", "2025-02-01T10:00:00.000Z", None);
        upcoming.upcoming = true;
        upcoming.rocket = "f9".into();
        let mut a = launch("a", "FalconSat", "2006-03-24T22:30:00.000Z", Some(false));
        a.rocket = "f1".into();
        let mut b = launch("b", "Starlink-1", "2024-11-11T14:56:00.000Z", Some(true));
        b.rocket = "f9".into();
        let mut c = launch("c", "Starlink-2", "2024-03-02T09:00:00.000Z", Some(true));
        c.rocket = "f9".into();
        let mut d = launch("d", "Falcon Heavy", "2024-03-20T09:00:00.000Z", Some(true));
        d.rocket = "fh".into();
        vec![upcoming, a, b, c, d]
    }

    #[test]
    fn test_statistics_counts_and_rate() {
        let stats = LaunchStatistics::compute(&fleet());
        assert_eq!(stats.total, 5);
        assert_eq!(stats.successful, 3);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.upcoming, 1);
        assert_eq!(stats.success_rate, 75);
        assert_eq!(
            stats.top_rockets,
            vec![("f9".to_string(), 3), ("f1".to_string(), 1), ("fh".to_string(), 1)]
        );
        assert_eq!(stats.recent_years, vec![(2025, 1), (2024, 3), (2006, 1)]);
    }

    #[test]
    fn test_statistics_empty() {
        let stats = LaunchStatistics::compute(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.success_rate, 0);
        assert!(stats.top_rockets.is_empty());
    }

    #[test]
    fn test_timeline_grouping() {
        let timeline = Timeline::build(&fleet());
        let years: Vec<i32> = timeline.years.iter().map(|y| y.year).collect();
        assert_eq!(years, vec![2025, 2024, 2006]);

        let y2024 = timeline.year(2024).unwrap();
        assert_eq!(y2024.total(), 3);
        let months: Vec<u32> = y2024.months.iter().map(|(m, _)| *m).collect();
        assert_eq!(months, vec![3, 11]);
        let march: Vec<&str> = y2024.months[0].1.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(march, vec!["c", "d"]);

        let cats = y2024.categories();
        let success: Vec<&str> = cats.success.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(success, vec!["b", "d", "c"]);
        assert!(cats.failed.is_empty());

        let cats = timeline.year(2025).unwrap().categories();
        assert_eq!(cats.upcoming.len(), 1);
    }

    #[test]
    fn test_timeline_navigation() {
        let timeline = Timeline::build(&fleet());
        assert_eq!(timeline.latest_year(), Some(2025));
        assert_eq!(timeline.previous_year(2025), Some(2024));
        assert_eq!(timeline.previous_year(2006), None);
        assert_eq!(timeline.next_year(2006), Some(2024));
        assert_eq!(timeline.next_year(2025), None);
        assert_eq!(timeline.next_year(1999), None);
    }
}
