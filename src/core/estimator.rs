//! Sample size for estimating a population proportion.
//!
//! Two closed forms are provided:
//!
//! * infinite population: `n = z²·p·q / B²`
//! * finite population:   `n = N·z²·p·q / ((N − 1)·B² + z²·p·q)`
//!
//! The finite form is used whenever `N` is known. It never exceeds `N` and
//! converges to the infinite form as `N` grows.

use crate::domain::model::{EstimationMethod, SampleSizeRequest, SampleSizeResult};
use crate::utils::error::{Result, SurveyError};
use crate::utils::validation::{
    validate_half_open, validate_population, validate_positive, validate_range, Validate,
};

fn validate_inputs(z: f64, p: f64, margin: f64) -> Result<()> {
    validate_positive("confidence_z", z)?;
    validate_range("proportion_p", p, 0.0, 1.0)?;
    validate_half_open("margin_of_error", margin, 1.0)?;
    Ok(())
}

/// `z²·p·q`, the variance term shared by both forms.
/// `p·q = 0` short-circuits so an overflowing `z²` cannot turn it into NaN.
fn variance_term(z: f64, p: f64) -> Result<f64> {
    let pq = p * (1.0 - p);
    if pq == 0.0 {
        return Ok(0.0);
    }
    let zpq = z * z * pq;
    if !zpq.is_finite() {
        return Err(SurveyError::invalid_parameter(
            "confidence_z",
            z,
            "z²·p·q overflows; z-score is too large",
        ));
    }
    Ok(zpq)
}

fn finite_result(field: &str, value: f64, required: f64) -> Result<f64> {
    if !required.is_finite() {
        return Err(SurveyError::invalid_parameter(
            field,
            value,
            "Required sample size is not representable",
        ));
    }
    Ok(required)
}

/// Required sample size when the population is unknown or effectively infinite.
pub fn estimate_infinite(z: f64, p: f64, margin: f64) -> Result<f64> {
    validate_inputs(z, p, margin)?;
    let zpq = variance_term(z, p)?;
    if zpq == 0.0 {
        return Ok(0.0);
    }
    // B² underflows to 0 for tiny margins
    finite_result("margin_of_error", margin, zpq / (margin * margin))
}

/// Required sample size with the finite-population correction for `population` units.
pub fn estimate_finite(population: u64, z: f64, p: f64, margin: f64) -> Result<f64> {
    validate_population("population_size", population)?;
    validate_inputs(z, p, margin)?;

    let zpq = variance_term(z, p)?;
    // p ∈ {0, 1}: nothing to estimate, and N = 1 would otherwise give 0/0
    if zpq == 0.0 {
        return Ok(0.0);
    }

    let n = population as f64;
    let required = n * zpq / ((n - 1.0) * margin * margin + zpq);
    Ok(finite_result("confidence_z", z, required)?.min(n))
}

/// Validates the whole request, then picks the form matching what is known
/// about the population.
pub fn estimate(request: &SampleSizeRequest) -> Result<SampleSizeResult> {
    request.validate()?;

    let (required_n, method) = match request.population_size {
        Some(population) => (
            estimate_finite(
                population,
                request.confidence_z,
                request.proportion_p,
                request.margin_of_error,
            )?,
            EstimationMethod::Finite,
        ),
        None => (
            estimate_infinite(
                request.confidence_z,
                request.proportion_p,
                request.margin_of_error,
            )?,
            EstimationMethod::Infinite,
        ),
    };

    tracing::trace!(
        ?method,
        population = ?request.population_size,
        z = request.confidence_z,
        p = request.proportion_p,
        margin = request.margin_of_error,
        required_n,
        "estimated sample size"
    );

    Ok(SampleSizeResult {
        required_n,
        proportion_q: request.proportion_q(),
        method,
    })
}
