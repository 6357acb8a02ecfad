use kinrec_embedstore::EnrollmentRecord;
use kinrec_vecmath::cosine_similarity;

use crate::error::MatchError;
use crate::outcome::Outcome;

fn similarity(query: &[f32], record: &EnrollmentRecord) -> Result<f32, MatchError> {
    cosine_similarity(query, &record.vector).map_err(|_| MatchError::RecordDimension {
        record: record.id,
        got: record.vector.len(),
        want: query.len(),
    })
}

/// Reports whether a similarity counts as positive evidence under
/// `threshold`. Zero and negative similarities are never accepted, even
/// with a threshold of 0.0.
pub fn accepts(similarity: f32, threshold: f32) -> bool {
    similarity > 0.0 && similarity >= threshold
}

/// Picks the best-matching record for `query` out of `records`.
///
/// A record is accepted when [`accepts`] holds for its similarity. Among
/// accepted records the highest similarity wins; exact ties go to the
/// record that [`precedes`](EnrollmentRecord::precedes) the other, so the
/// result does not depend on the order of `records`.
///
/// When nothing is accepted the outcome is `NoMatch` with the highest
/// similarity seen, floored at 0.0.
///
/// Any record whose length differs from the query aborts the scan with
/// [`MatchError::RecordDimension`].
pub fn select_best(
    query: &[f32],
    records: &[EnrollmentRecord],
    threshold: f32,
) -> Result<Outcome, MatchError> {
    let mut best: Option<(&EnrollmentRecord, f32)> = None;
    let mut observed: f32 = 0.0;

    for record in records {
        let sim = similarity(query, record)?;
        observed = observed.max(sim);
        if !accepts(sim, threshold) {
            continue;
        }
        let replace = match best {
            None => true,
            Some((current, best_sim)) => {
                sim > best_sim || (sim == best_sim && record.precedes(current))
            }
        };
        if replace {
            best = Some((record, sim));
        }
    }

    Ok(match best {
        Some((record, confidence)) => Outcome::Match {
            owner_id: record.owner_id.clone(),
            confidence,
        },
        None => Outcome::NoMatch {
            confidence: observed,
        },
    })
}

/// Returns the highest raw similarity between `query` and any of
/// `records`, or `None` when `records` is empty. The value may be
/// negative; callers decide acceptance with [`accepts`].
pub fn best_score(query: &[f32], records: &[&EnrollmentRecord]) -> Result<Option<f32>, MatchError> {
    let mut best: Option<f32> = None;
    for record in records {
        let sim = similarity(query, record)?;
        best = Some(best.map_or(sim, |b| b.max(sim)));
    }
    Ok(best)
}
