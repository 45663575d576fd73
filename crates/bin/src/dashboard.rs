//! Interactive prediction dashboard.

use crate::form::{Form, QUIT};
use revcast::PredictionService;
use std::io::{self, BufRead, Write};
use tracing::{info, warn};

/// Form loop in front of a prediction service.
#[derive(Debug)]
pub(crate) struct Dashboard<R, W> {
    service: PredictionService,
    form: Form<R, W>,
}

impl<R: BufRead, W: Write> Dashboard<R, W> {
    /// Serve `service` on the given input and output.
    pub(crate) fn new(service: PredictionService, input: R, output: W) -> Self {
        let regions = service.artifact().preprocessor().encoder().categories().to_vec();
        Self {
            service,
            form: Form::new(input, output, regions),
        }
    }

    /// Show the model panel, then answer requests until the user quits.
    ///
    /// Failed requests are reported and the loop carries on. Only I/O errors
    /// on the terminal end it early.
    pub(crate) fn run(&mut self) -> io::Result<()> {
        let panel = self.service.quality_summary().to_ascii_table();
        let out = self.form.output();
        writeln!(out, "{panel}")?;
        writeln!(
            out,
            "Enter company details to estimate annual revenue ('{QUIT}' to quit)."
        )?;

        let mut served = 0usize;
        let mut failed = 0usize;
        while let Some(features) = self.form.next_request()? {
            match self.service.predict(&features) {
                Ok(prediction) => {
                    served += 1;
                    let report = prediction.report(&features).to_ascii_table();
                    writeln!(self.form.output(), "{report}")?;
                }
                Err(e) => {
                    failed += 1;
                    warn!(kind = %e.kind(), "prediction request failed");
                    writeln!(self.form.output(), "Error ({}): {e}\n", e.kind())?;
                }
            }
        }

        writeln!(self.form.output(), "Goodbye.")?;
        info!(served, failed, "dashboard closed");
        Ok(())
    }
}
