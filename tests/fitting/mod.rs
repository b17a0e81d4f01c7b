//! Fitting a model to a single light curve

mod lightcurve_tests;
mod lm_fitting;
