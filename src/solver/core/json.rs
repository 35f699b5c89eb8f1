use super::traits::JSONReadWrite;
use super::{ConvergedReason, EigenSettings, EigenSolution};
use crate::algebra::*;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::io::Write;
use std::{fs::File, io, io::Read};

// The solution with its eigenvectors flattened to column major data, and
// non-finite error estimates replaced by values JSON can hold.

#[derive(Serialize, Deserialize)]
#[serde(bound = "T: Serialize + DeserializeOwned")]
struct JsonSolution<T: FloatT> {
    pub n: usize,
    pub eigr: Vec<T>,
    pub eigi: Vec<T>,
    pub errest: Vec<T>,
    pub perm: Vec<usize>,
    pub vectors: Vec<T>,
    pub nconv: usize,
    pub nev: usize,
    pub its: u32,
    pub reason: ConvergedReason,
    pub breakdown_step: Option<usize>,
    pub solve_time: f64,
}

impl<T> JSONReadWrite for EigenSettings<T>
where
    T: FloatT + DeserializeOwned + Serialize,
{
    fn write_to_file(&self, file: &mut File) -> Result<(), io::Error> {
        let json = serde_json::to_string(self)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    fn read_from_file(file: &mut File) -> Result<Self, io::Error> {
        let mut buffer = String::new();
        file.read_to_string(&mut buffer)?;
        let settings: EigenSettings<T> = serde_json::from_str(&buffer)?;

        settings
            .validate()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(settings)
    }
}

impl<T> JSONReadWrite for EigenSolution<T>
where
    T: FloatT + DeserializeOwned + Serialize,
{
    fn write_to_file(&self, file: &mut File) -> Result<(), io::Error> {
        let mut json_data = JsonSolution {
            n: self.vectors.m,
            eigr: self.eigr.clone(),
            eigi: self.eigi.clone(),
            errest: self.errest.clone(),
            perm: self.perm.clone(),
            vectors: self.vectors.data.clone(),
            nconv: self.nconv,
            nev: self.nev,
            its: self.its,
            reason: self.reason,
            breakdown_step: self.breakdown_step,
            solve_time: self.solve_time,
        };

        // serde_json writes infinities as null
        sanitize_estimates(&mut json_data.errest);

        let json = serde_json::to_string(&json_data)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }

    fn read_from_file(file: &mut File) -> Result<Self, io::Error> {
        let mut buffer = String::new();
        file.read_to_string(&mut buffer)?;
        let mut json_data: JsonSolution<T> = serde_json::from_str(&buffer)?;

        desanitize_estimates(&mut json_data.errest);

        let n = json_data.n;
        let ncols = json_data.vectors.len().checked_div(n).unwrap_or(0);
        let len = json_data.eigr.len();
        if ncols * n != json_data.vectors.len()
            || json_data.eigi.len() != len
            || json_data.errest.len() != len
            || json_data.perm.iter().any(|&j| j >= len)
            || len > ncols
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "inconsistent eigensolution dimensions",
            ));
        }

        let mut solution = EigenSolution::new(n, ncols, json_data.nev);
        solution.eigr = json_data.eigr;
        solution.eigi = json_data.eigi;
        solution.errest = json_data.errest;
        solution.perm = json_data.perm;
        solution.vectors.data = json_data.vectors;
        solution.nconv = json_data.nconv;
        solution.its = json_data.its;
        solution.reason = json_data.reason;
        solution.breakdown_step = json_data.breakdown_step;
        solution.solve_time = json_data.solve_time;

        Ok(solution)
    }
}

fn sanitize_estimates<T: FloatT>(errest: &mut [T]) {
    for e in errest.iter_mut().filter(|e| e.is_infinite()) {
        *e = T::max_value();
    }
}

fn desanitize_estimates<T: FloatT>(errest: &mut [T]) {
    for e in errest.iter_mut().filter(|e| **e == T::max_value()) {
        *e = T::infinity();
    }
}
