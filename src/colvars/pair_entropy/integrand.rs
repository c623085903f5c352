/* ************************************************************************ **
** This file is part of rsp2, and is licensed under EITHER the MIT license  **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
**                                                                          **
** Be aware that not all of rsp2 is provided under this permissive license, **
** and that the project as a whole is licensed under the GPL 3.0.           **
** ************************************************************************ */

//! The entropy integrand, built from a normalized g(r).

/// Values of g(r) (and of a reference g(r)) below this are treated as zero.
pub const GOFR_FLOOR: f64 = 1e-10;

/// Per-bin quantities derived from g(r) that feed the integrals.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Integrand {
    /// The function whose integral is the (negated, scaled) entropy.
    pub integrand: Vec<f64>,
    /// `ln g * r²` (or `ln(g / g_ref) * r²`) on bins where g(r) is resolved, else zero.
    ///
    /// This is the derivative of `integrand` with respect to `g`, which is all that is
    /// needed to carry gradients of g(r) through the integral.
    pub deriv_weights: Vec<f64>,
    /// First bin where g(r) is at or above the floor.
    pub first_resolved: Option<usize>,
}

impl Integrand {
    pub fn build(gofr: &[f64], reference: Option<&[f64]>, r_sq: &[f64]) -> Integrand {
        assert_eq!(gofr.len(), r_sq.len());
        if let Some(reference) = reference {
            assert_eq!(reference.len(), r_sq.len());
        }

        let nhist = gofr.len();
        let mut integrand = vec![0.0; nhist];
        let mut deriv_weights = vec![0.0; nhist];
        for k in 0..nhist {
            let g = gofr[k];
            let resolved = g >= GOFR_FLOOR;
            let (log, leading) = match reference {
                Some(reference) => {
                    let g_ref = reference[k];
                    let log = match (resolved, g_ref < GOFR_FLOOR) {
                        (true, false) => f64::ln(g / g_ref),
                        _ => 0.0,
                    };
                    (log, g_ref)
                },
                None => (if resolved { f64::ln(g) } else { 0.0 }, 1.0),
            };

            integrand[k] = match resolved {
                true => (g * log - g + leading) * r_sq[k],
                false => leading * r_sq[k],
            };
            if resolved {
                deriv_weights[k] = log * r_sq[k];
            }
        }

        let first_resolved = gofr.iter().position(|&g| g >= GOFR_FLOOR);
        Integrand { integrand, deriv_weights, first_resolved }
    }
}

/// Integrand of the volume term of the virial: `(g_ref - g) r²`, with `g_ref = 1` by default.
pub(crate) fn volume_virial_integrand(gofr: &[f64], reference: Option<&[f64]>, r_sq: &[f64]) -> Vec<f64> {
    (0..gofr.len()).map(|k| {
        let leading = reference.map_or(1.0, |reference| reference[k]);
        (leading - gofr[k]) * r_sq[k]
    }).collect()
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use crate::numerical;

    const R_SQ: &[f64] = &[0.0, 0.25, 1.0, 2.25];

    #[test]
    fn ideal_gas_vanishes() {
        let out = Integrand::build(&[1.0; 4], None, R_SQ);
        assert_eq!(out.integrand, vec![0.0; 4]);
        assert_eq!(out.deriv_weights, vec![0.0; 4]);
        assert_eq!(out.first_resolved, Some(0));
    }

    #[test]
    fn floors() {
        let gofr = [0.0, 1e-12, 2.0, 0.5];
        let out = Integrand::build(&gofr, None, R_SQ);
        assert_eq!(out.first_resolved, Some(2));
        assert_eq!(out.integrand[1], 0.25);
        assert_eq!(out.deriv_weights[1], 0.0);
        assert_eq!(out.integrand[2], (2.0 * f64::ln(2.0) - 2.0 + 1.0) * 1.0);

        let reference = [0.0, 0.5, 1e-11, 0.5];
        let out = Integrand::build(&gofr, Some(&reference), R_SQ);
        // unresolved g: the leading term
        assert_eq!(out.integrand[1], 0.5 * 0.25);
        // unresolved reference: no log
        assert_eq!(out.deriv_weights[2], 0.0);
        assert_eq!(out.integrand[2], (-2.0 + 1e-11) * 1.0);
        // equal to the reference
        assert_eq!(out.deriv_weights[3], 0.0);
        assert_eq!(out.integrand[3], 0.0);

        assert_eq!(Integrand::build(&[0.0; 4], None, R_SQ).first_resolved, None);
    }

    #[test]
    fn weights_are_derivatives() {
        let gofr = [0.0, 0.3, 1.7, 0.9];
        let reference = [0.0, 0.4, 1.2, 1.1];
        for &reference in &[None, Some(&reference[..])] {
            let out = Integrand::build(&gofr, reference, R_SQ);
            for k in 1..4 {
                let expected = numerical::slope(1e-5, None, gofr[k], |g| {
                    let mut gofr = gofr;
                    gofr[k] = g;
                    Integrand::build(&gofr, reference, R_SQ).integrand[k]
                });
                assert_close!(rel=1e-8, abs=1e-10, out.deriv_weights[k], expected);
            }
        }
    }

    #[test]
    fn volume_term() {
        let gofr = [0.0, 0.5, 1.0, 2.0];
        assert_eq!(volume_virial_integrand(&gofr, None, R_SQ), vec![0.0, 0.125, 0.0, -2.25]);
        let reference = [1.0, 1.0, 2.0, 2.0];
        assert_eq!(volume_virial_integrand(&gofr, Some(&reference), R_SQ), vec![0.0, 0.125, 1.0, 0.0]);
    }
}
