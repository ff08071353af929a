use crate::domain::model::{
    AgeShare, AgeSexCount, Composition, G01Record, G02Record, Sex, SuburbRecord,
};
use crate::domain::ports::NameLookup;
use std::collections::HashMap;

/// Merges G01 and G02 records into suburb records, one per G01 entry.
#[derive(Default)]
pub struct SuburbAggregator {
    names: Option<Box<dyn NameLookup>>,
}

impl SuburbAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_names(names: impl NameLookup + 'static) -> Self {
        Self {
            names: Some(Box::new(names)),
        }
    }

    pub fn placeholder_name(area_code: &str) -> String {
        format!("Area {}", area_code)
    }

    /// G02 duplicates resolve last-write-wins. Without a matching G02 entry
    /// every G02-derived field stays `None`.
    pub fn aggregate(&self, g01: &[G01Record], g02: &[G02Record]) -> Vec<SuburbRecord> {
        let medians: HashMap<&str, &G02Record> = g02
            .iter()
            .map(|record| (record.area_code.as_str(), record))
            .collect();

        let suburbs: Vec<SuburbRecord> = g01
            .iter()
            .map(|person| self.build(person, medians.get(person.area_code.as_str()).copied()))
            .collect();

        tracing::debug!(
            "Aggregated {} suburbs ({} with G02 data)",
            suburbs.len(),
            suburbs.iter().filter(|s| s.is_enriched()).count()
        );
        suburbs
    }

    fn build(&self, person: &G01Record, medians: Option<&G02Record>) -> SuburbRecord {
        let name = self
            .names
            .as_ref()
            .and_then(|names| names.name_for(&person.area_code))
            .map(str::to_string)
            .unwrap_or_else(|| Self::placeholder_name(&person.area_code));

        let estimated_households = medians
            .filter(|m| m.average_household_size > 0.0 && person.total_population > 0)
            .map(|m| (person.total_population as f64 / m.average_household_size).round() as u64);

        SuburbRecord {
            area_code: person.area_code.clone(),
            name,
            population: person.total_population,
            median_age: medians.map(|m| m.median_age),
            median_household_income_weekly: medians.map(|m| m.median_household_income_weekly),
            median_personal_income_weekly: medians.map(|m| m.median_personal_income_weekly),
            median_rent_weekly: medians.map(|m| m.median_rent_weekly),
            average_household_size: medians.map(|m| m.average_household_size),
            estimated_households,
            composition: composition(person),
        }
    }
}

pub fn aggregate(g01: &[G01Record], g02: &[G02Record]) -> Vec<SuburbRecord> {
    SuburbAggregator::new().aggregate(g01, g02)
}

fn percent(part: u64, whole: u64) -> f64 {
    (part as f64 / whole as f64 * 1000.0).round() / 10.0
}

fn bracket_lower(bracket: &str) -> u32 {
    bracket
        .split(['-', '+'])
        .next()
        .and_then(|lower| lower.parse().ok())
        .unwrap_or(u32::MAX)
}

fn composition(person: &G01Record) -> Composition {
    let total = person.total_population;
    let counts: &[AgeSexCount] = &person.age_sex;
    if total == 0 {
        return Composition::default();
    }

    let sum_of = |sex: Sex| -> u64 {
        counts
            .iter()
            .filter(|c| c.sex == sex)
            .map(|c| c.count)
            .sum()
    };
    // 有性別總數欄位時優先, 否則加總年齡層
    let (male, female) = match (person.male_total, person.female_total) {
        (Some(male), Some(female)) => (male, female),
        _ => (sum_of(Sex::Male), sum_of(Sex::Female)),
    };

    let (male_percent, female_percent) = if male + female > 0 {
        (Some(percent(male, total)), Some(percent(female, total)))
    } else {
        (None, None)
    };

    // 每個年齡層: 有 P 欄位時用 P, 否則 M + F
    let mut per_bracket: HashMap<&str, (u64, Option<u64>)> = HashMap::new();
    for count in counts {
        let entry = per_bracket.entry(count.bracket.as_str()).or_default();
        match count.sex {
            Sex::Persons => entry.1 = Some(entry.1.unwrap_or(0) + count.count),
            Sex::Male | Sex::Female => entry.0 += count.count,
        }
    }

    let mut age_brackets: Vec<AgeShare> = per_bracket
        .into_iter()
        .map(|(bracket, (by_sex, persons))| AgeShare {
            bracket: bracket.to_string(),
            percent: percent(persons.unwrap_or(by_sex), total),
        })
        .collect();
    age_brackets.sort_by(|a, b| {
        bracket_lower(&a.bracket)
            .cmp(&bracket_lower(&b.bracket))
            .then_with(|| a.bracket.cmp(&b.bracket))
    });

    Composition {
        male_percent,
        female_percent,
        age_brackets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedNames(HashMap<String, String>);

    impl NameLookup for FixedNames {
        fn name_for(&self, area_code: &str) -> Option<&str> {
            self.0.get(area_code).map(String::as_str)
        }
    }

    fn g01(code: &str, total: u64, counts: &[(Sex, &str, u64)]) -> G01Record {
        G01Record {
            area_code: code.to_string(),
            total_population: total,
            age_sex: counts
                .iter()
                .map(|(sex, bracket, count)| AgeSexCount {
                    sex: *sex,
                    bracket: bracket.to_string(),
                    count: *count,
                })
                .collect(),
            male_total: None,
            female_total: None,
        }
    }

    fn g02(code: &str, median_age: f64, household_size: f64) -> G02Record {
        G02Record {
            area_code: code.to_string(),
            median_age,
            median_household_income_weekly: 1800.0,
            median_personal_income_weekly: 900.0,
            median_rent_weekly: 420.0,
            average_household_size: household_size,
        }
    }

    #[test]
    fn test_without_g02_uses_defaults() {
        let input = vec![g01("1", 100, &[]), g01("2", 200, &[]), g01("1", 50, &[])];
        let suburbs = aggregate(&input, &[]);

        assert_eq!(suburbs.len(), input.len());
        for suburb in &suburbs {
            assert!(!suburb.is_enriched());
            assert_eq!(suburb.median_age, None);
            assert_eq!(suburb.median_household_income_weekly, None);
            assert_eq!(suburb.median_personal_income_weekly, None);
            assert_eq!(suburb.median_rent_weekly, None);
            assert_eq!(suburb.average_household_size, None);
            assert_eq!(suburb.estimated_households, None);
        }
        assert_eq!(suburbs[0].name, "Area 1");
        assert_eq!(suburbs[2].population, 50);
    }

    #[test]
    fn test_matching_g02_enriches_every_record() {
        let input = vec![g01("1", 100, &[]), g01("2", 260, &[])];
        let medians = vec![g02("2", 41.0, 2.6), g02("1", 35.0, 2.5)];
        let suburbs = aggregate(&input, &medians);

        assert!(suburbs.iter().all(SuburbRecord::is_enriched));
        assert_eq!(suburbs[0].median_age, Some(35.0));
        assert_eq!(suburbs[1].median_age, Some(41.0));
        assert_eq!(suburbs[1].median_rent_weekly, Some(420.0));
        assert_eq!(suburbs[1].estimated_households, Some(100));
    }

    #[test]
    fn test_g02_duplicates_last_write_wins() {
        let input = vec![g01("1", 100, &[])];
        let medians = vec![g02("1", 30.0, 2.0), g02("1", 44.0, 2.0)];
        let suburbs = aggregate(&input, &medians);

        assert_eq!(suburbs[0].median_age, Some(44.0));
    }

    #[test]
    fn test_unmatched_g02_is_ignored() {
        let input = vec![g01("1", 100, &[])];
        let suburbs = aggregate(&input, &[g02("9", 30.0, 2.0)]);

        assert_eq!(suburbs.len(), 1);
        assert!(!suburbs[0].is_enriched());
    }

    #[test]
    fn test_zero_household_size_has_no_estimate() {
        let suburbs = aggregate(&[g01("1", 100, &[])], &[g02("1", 30.0, 0.0)]);
        assert_eq!(suburbs[0].average_household_size, Some(0.0));
        assert_eq!(suburbs[0].estimated_households, None);
    }

    #[test]
    fn test_composition_percentages() {
        let input = vec![g01(
            "1",
            200,
            &[
                (Sex::Male, "0-4", 10),
                (Sex::Male, "15-19", 30),
                (Sex::Female, "0-4", 20),
                (Sex::Female, "15-19", 40),
                (Sex::Female, "85+", 5),
            ],
        )];
        let composition = &aggregate(&input, &[])[0].composition;

        assert_eq!(composition.male_percent, Some(20.0));
        assert_eq!(composition.female_percent, Some(32.5));
        assert_eq!(
            composition.age_brackets,
            vec![
                AgeShare {
                    bracket: "0-4".to_string(),
                    percent: 15.0
                },
                AgeShare {
                    bracket: "15-19".to_string(),
                    percent: 35.0
                },
                AgeShare {
                    bracket: "85+".to_string(),
                    percent: 2.5
                },
            ]
        );
    }

    #[test]
    fn test_persons_column_preferred_over_sum() {
        let input = vec![g01(
            "1",
            100,
            &[
                (Sex::Male, "0-4", 3),
                (Sex::Female, "0-4", 3),
                (Sex::Persons, "0-4", 7),
            ],
        )];
        let composition = &aggregate(&input, &[])[0].composition;
        assert_eq!(composition.age_brackets[0].percent, 7.0);
    }

    #[test]
    fn test_sex_totals_preferred_over_bracket_sum() {
        let mut person = g01("1", 100, &[(Sex::Male, "0-4", 10), (Sex::Female, "0-4", 10)]);
        person.male_total = Some(49);
        person.female_total = Some(51);

        let composition = &aggregate(&[person], &[])[0].composition;
        assert_eq!(composition.male_percent, Some(49.0));
        assert_eq!(composition.female_percent, Some(51.0));
        assert_eq!(composition.age_brackets[0].percent, 20.0);
    }

    #[test]
    fn test_zero_population_has_empty_composition() {
        let input = vec![g01("1", 0, &[(Sex::Male, "0-4", 3)])];
        assert_eq!(aggregate(&input, &[])[0].composition, Composition::default());
    }

    #[test]
    fn test_names_from_lookup() {
        let names = FixedNames(HashMap::from([(
            "501".to_string(),
            "Fremantle".to_string(),
        )]));
        let aggregator = SuburbAggregator::with_names(names);
        let suburbs = aggregator.aggregate(&[g01("501", 10, &[]), g01("502", 10, &[])], &[]);

        assert_eq!(suburbs[0].name, "Fremantle");
        assert_eq!(suburbs[1].name, "Area 502");
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let input = vec![g01("1", 100, &[(Sex::Male, "0-4", 1), (Sex::Female, "5-9", 2)])];
        let medians = vec![g02("1", 30.0, 2.0)];
        assert_eq!(aggregate(&input, &medians), aggregate(&input, &medians));
    }
}
