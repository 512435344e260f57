use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::Blueprint;

/// Read-time transformation applied to blueprints before they are returned.
///
/// A filter never touches the blueprint it is given; it always returns a new
/// value with the same author and name.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BlueprintFilter {
    /// Returns blueprints unchanged.
    #[default]
    Identity,
    /// Collapses runs of consecutive duplicate points into one.
    Redundancy,
    /// Keeps only the points at even indices.
    Undersampling,
}

impl BlueprintFilter {
    pub fn apply(&self, blueprint: &Blueprint) -> Blueprint {
        match self {
            BlueprintFilter::Identity => blueprint.clone(),
            BlueprintFilter::Redundancy => remove_redundant(blueprint),
            BlueprintFilter::Undersampling => undersample(blueprint),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BlueprintFilter::Identity => "identity",
            BlueprintFilter::Redundancy => "redundancy",
            BlueprintFilter::Undersampling => "undersampling",
        }
    }
}

fn remove_redundant(blueprint: &Blueprint) -> Blueprint {
    if blueprint.points.len() < 2 {
        return blueprint.clone();
    }

    let mut points = blueprint.points.clone();
    points.dedup();
    blueprint.with_points(points)
}

fn undersample(blueprint: &Blueprint) -> Blueprint {
    if blueprint.points.len() <= 2 {
        return blueprint.clone();
    }

    let points = blueprint.points.iter().step_by(2).copied().collect();
    blueprint.with_points(points)
}

impl fmt::Display for BlueprintFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use crate::models::Point;

    use super::*;

    fn bp(coords: &[(i32, i32)]) -> Blueprint {
        Blueprint::new(
            "john",
            "house",
            coords.iter().copied().map(Point::from).collect(),
        )
    }

    fn coords(blueprint: &Blueprint) -> Vec<(i32, i32)> {
        blueprint.points.iter().map(|p| (p.x, p.y)).collect()
    }

    #[test]
    fn identity_returns_the_same_blueprint() {
        let input = bp(&[(1, 1), (1, 1), (2, 2)]);
        let output = BlueprintFilter::Identity.apply(&input);
        assert_eq!(coords(&output), coords(&input));
        assert_eq!(output.key(), input.key());
    }

    #[test]
    fn redundancy_collapses_consecutive_duplicates() {
        let input = bp(&[(1, 1), (2, 2), (2, 2), (3, 3), (3, 3), (4, 4)]);
        let output = BlueprintFilter::Redundancy.apply(&input);

        assert_eq!(coords(&output), vec![(1, 1), (2, 2), (3, 3), (4, 4)]);
        assert_eq!(output.author, "john");
        assert_eq!(output.name, "house");
        assert_eq!(input.points.len(), 6);
    }

    #[test]
    fn redundancy_keeps_non_consecutive_duplicates() {
        let input = bp(&[(1, 1), (2, 2), (1, 1), (1, 1), (1, 1)]);
        let output = BlueprintFilter::Redundancy.apply(&input);
        assert_eq!(coords(&output), vec![(1, 1), (2, 2), (1, 1)]);
    }

    #[test]
    fn redundancy_passes_short_inputs_through() {
        assert!(BlueprintFilter::Redundancy.apply(&bp(&[])).points.is_empty());
        assert_eq!(
            coords(&BlueprintFilter::Redundancy.apply(&bp(&[(5, 5)]))),
            vec![(5, 5)]
        );
    }

    #[test]
    fn undersampling_keeps_even_indices() {
        let input = bp(&[(1, 1), (2, 2), (3, 3), (4, 4), (5, 5), (6, 6)]);
        let output = BlueprintFilter::Undersampling.apply(&input);

        assert_eq!(coords(&output), vec![(1, 1), (3, 3), (5, 5)]);
        assert_eq!(
            coords(&input),
            vec![(1, 1), (2, 2), (3, 3), (4, 4), (5, 5), (6, 6)]
        );
    }

    #[test]
    fn undersampling_keeps_the_last_point_of_odd_lengths() {
        let output = BlueprintFilter::Undersampling.apply(&bp(&[(1, 1), (2, 2), (3, 3)]));
        assert_eq!(coords(&output), vec![(1, 1), (3, 3)]);
    }

    #[test]
    fn undersampling_passes_short_inputs_through() {
        for input in [bp(&[]), bp(&[(1, 1)]), bp(&[(1, 1), (2, 2)])] {
            let output = BlueprintFilter::Undersampling.apply(&input);
            assert_eq!(coords(&output), coords(&input));
        }
    }

    #[test]
    fn filters_keep_the_surrogate_id() {
        let mut input = bp(&[(1, 1), (1, 1), (2, 2), (3, 3)]);
        input.id = Some("42".into());
        for filter in [
            BlueprintFilter::Identity,
            BlueprintFilter::Redundancy,
            BlueprintFilter::Undersampling,
        ] {
            assert_eq!(filter.apply(&input).id.as_deref(), Some("42"));
        }
    }

    #[test]
    fn parses_filter_names() {
        let parsed: BlueprintFilter = serde_json::from_str("\"identity\"").unwrap();
        assert_eq!(parsed, BlueprintFilter::Identity);
        let parsed: BlueprintFilter = serde_json::from_str("\"undersampling\"").unwrap();
        assert_eq!(parsed, BlueprintFilter::Undersampling);
        assert!(serde_json::from_str::<BlueprintFilter>("\"median\"").is_err());
        assert_eq!(BlueprintFilter::Redundancy.to_string(), "redundancy");
    }
}
