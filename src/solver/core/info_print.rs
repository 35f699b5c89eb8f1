use super::traits::InfoPrint;
use super::{
    ConvergenceTest, EigenInfo, EigenSettings, Extraction, RestartType, SpectralTransform, TransformKind,
};
use crate::algebra::*;
use crate::io::{ConfigurablePrintTarget, PrintTarget};
use crate::solver::core::operator::LinearOperator;
use crate::timers::*;
use std::io::Write;
use std::time::Duration;

impl<T> ConfigurablePrintTarget for EigenInfo<T> {
    fn print_to_stdout(&mut self) {
        self.stream.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.stream.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.stream.print_to_stream(stream)
    }
    fn print_to_buffer(&mut self) {
        self.stream.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.stream.get_print_buffer()
    }
    fn print_target(&mut self) -> &dyn Write {
        &self.stream
    }
}

macro_rules! expformat {
    ($fmt:expr,$val:expr) => {
        if $val.is_finite() {
            _exp_str_reformat(format!($fmt, $val))
        } else {
            format!($fmt, $val)
        }
    };
}

impl<T> InfoPrint<T> for EigenInfo<T>
where
    T: FloatT,
{
    fn print_configuration(
        &mut self,
        settings: &EigenSettings<T>,
        op: &SpectralTransform<T>,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        let out = &mut self.stream;

        _print_banner(out)?;

        writeln!(out, "\nproblem:")?;
        writeln!(out, "  dimension     = {}", op.nrows())?;
        writeln!(out, "  type          = {:?}", settings.problem_type)?;
        writeln!(
            out,
            "  generalized   = {}",
            _bool_yes_no(op.is_generalized())
        )?;
        write!(out, "  transform     = {}", op.kind().name())?;
        match *op.kind() {
            TransformKind::Cayley { sigma, nu } => {
                write!(out, " (σ = {}, ν = {})", expformat!("{:.3e}", sigma), expformat!("{:.3e}", nu))?
            }
            _ => {
                if let Some(sigma) = op.kind().sigma() {
                    write!(out, " (σ = {})", expformat!("{:.3e}", sigma))?;
                }
            }
        }
        writeln!(out,)?;
        writeln!(out,)?;

        self.print_settings(settings)?;

        std::io::Result::Ok(())
    }

    fn print_status_header(&mut self, settings: &EigenSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        let out = &mut self.stream;

        //print a subheader for the iterations info
        write!(out, "iter    ")?;
        write!(out, "nconv    ")?;
        write!(out, "errest      ")?;
        write!(out, "restart")?;
        writeln!(out,)?;
        writeln!(
            out,
            "----------------------------------------"
        )?;
        out.flush()?;
        std::io::Result::Ok(())
    }

    fn print_status(&mut self, settings: &EigenSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        let out = &mut self.stream;

        write!(out, "{:>4}  ", self.iterations)?;
        write!(out, "{:>5}/{:<3}", self.nconv, self.nev)?;
        if self.nconv < self.nev {
            write!(out, "{}  ", expformat!("{:8.2e}", self.errest))?;
        } else {
            write!(out, " ------   ")?;
        }
        write!(out, "{:>5}", self.restart_size)?;
        writeln!(out,)?;

        std::io::Result::Ok(())
    }

    fn print_footer(
        &mut self,
        settings: &EigenSettings<T>,
        timers: &Timers,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        let out = &mut self.stream;

        writeln!(
            out,
            "----------------------------------------"
        )?;

        writeln!(out, "Terminated with reason = {}", self.reason)?;
        writeln!(
            out,
            "converged = {} of {} requested, iterations = {}",
            self.nconv, self.nev, self.iterations
        )?;
        if self.breakdowns > 0 {
            writeln!(out, "invariant subspaces found = {}", self.breakdowns)?;
        }

        writeln!(
            out,
            "solve time = {:?}",
            Duration::from_secs_f64(self.solve_time)
        )?;
        timers.print(out)?;

        std::io::Result::Ok(())
    }
}

impl<T> EigenInfo<T>
where
    T: FloatT,
{
    fn print_settings(&mut self, settings: &EigenSettings<T>) -> std::io::Result<()> {
        let out = &mut self.stream;

        let set = settings;

        writeln!(out, "settings:")?;

        writeln!(
            out,
            "  method: {}, precision: {} bit",
            self.method,
            _get_precision_string::<T>()
        )?;

        writeln!(
            out,
            "  nev = {}, ncv = {}, max iter = {}",
            self.nev, self.ncv, self.max_it
        )?;

        write!(out, "  which = {:?}", set.which)?;
        if set.which.needs_target() {
            write!(out, " (target = {})", expformat!("{:.3e}", set.target))?;
        }
        if set.extraction == Extraction::Harmonic {
            write!(out, ", harmonic extraction")?;
        }
        writeln!(out,)?;

        write!(
            out,
            "  tol = {:.1e}, test = {:?}, true residual = {}",
            set.tol,
            set.conv_test,
            _bool_on_off(set.true_residual)
        )?;
        if set.conv_test == ConvergenceTest::User {
            write!(out, " (user)")?;
        }
        writeln!(out,)?;

        match set.restart {
            RestartType::Thick => writeln!(out, "  restart: thick, keep = {:.2}", set.keep)?,
            RestartType::Explicit => writeln!(out, "  restart: explicit")?,
        }

        writeln!(
            out,
            "  orthog: {:?}, refine = {:?}, η = {:.3}, breakdown tol = {:.1e}",
            set.orthog_type, set.orthog_refine, set.orthog_eta, set.breakdown_tol
        )?;

        writeln!(out,)?;

        std::io::Result::Ok(())
    }
}

fn _print_banner(out: &mut PrintTarget) -> std::io::Result<()> {
    writeln!(out, "-------------------------------------------------------------")?;
    writeln!(
        out,
        "           krylov v{}  -  Krylov Subspace Eigensolvers",
        crate::VERSION
    )?;
    writeln!(out, "-------------------------------------------------------------")
}

fn _bool_on_off(v: bool) -> &'static str {
    match v {
        true => "on",
        false => "off",
    }
}

fn _bool_yes_no(v: bool) -> &'static str {
    match v {
        true => "yes",
        false => "no",
    }
}

fn _get_precision_string<T: FloatT>() -> String {
    (::std::mem::size_of::<T>() * 8).to_string()
}

// convert a string in LowerExp display format into one that
// 1) always has a sign after the exponent, and
// 2) has at least two digits in the exponent.

fn _exp_str_reformat(mut thestr: String) -> String {
    let eidx = match thestr.find('e') {
        Some(idx) => idx,
        None => return thestr,
    };
    let has_sign = thestr[eidx + 1..].starts_with('-');

    let has_short_exp = {
        if !has_sign {
            thestr.len() == eidx + 2
        } else {
            thestr.len() == eidx + 3
        }
    };

    let chars = match (has_sign, has_short_exp) {
        (false, true) => "+0",
        (false, false) => "+",
        (true, true) => "0",
        (true, false) => "",
    };

    let shift = if has_sign { 2 } else { 1 };
    thestr.insert_str(eidx + shift, chars);
    thestr
}

#[test]
fn test_exp_str_reformat() {
    assert_eq!(_exp_str_reformat(format!("{:.2e}", 1.5e-3)), "1.50e-03");
    assert_eq!(_exp_str_reformat(format!("{:.2e}", 2.0e12)), "2.00e+12");
    assert_eq!(_exp_str_reformat(format!("{:.2e}", 1.0)), "1.00e+00");
    assert_eq!(_exp_str_reformat("nan".to_string()), "nan");
}
