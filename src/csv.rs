use crate::domain::*;
use crate::error::*;
use crate::sparse::{TimeAxis, Traces};
use crate::util::*;
use std::io::prelude::*;

fn create<P: AsRef<std::path::Path>>(
    path: &P,
) -> Result<std::io::BufWriter<std::fs::File>> {
    log::info!("writing {:?}", path.as_ref());
    Ok(std::io::BufWriter::new(std::fs::File::create(path)?))
}

/// One line per time sample, the first column is time.
pub fn write_traces<W: Write>(
    traces: &Traces,
    axis: &TimeAxis,
    output: &mut W,
) -> Result<()> {
    write!(output, "time")?;
    for p in 0..traces.npoint() {
        write!(output, ", r{p}")?;
    }
    writeln!(output)?;
    for t in 0..traces.nt() {
        write!(output, "{}", axis.time(t))?;
        for r in traces.row(t) {
            write!(output, ", {r}")?;
        }
        writeln!(output)?;
    }
    Ok(())
}

pub fn write_traces_csv<P: AsRef<std::path::Path>>(
    traces: &Traces,
    axis: &TimeAxis,
    path: &P,
) -> Result<()> {
    let mut output = create(path)?;
    write_traces(traces, axis, &mut output)?;
    output.flush()?;
    Ok(())
}

/// One line per axis 0 index.
pub fn write_csv_2d<P: AsRef<std::path::Path>, DomainType: DomainView<2>>(
    domain: &DomainType,
    path: &P,
) -> Result<()> {
    let mut output = create(path)?;
    let aabb = domain.aabb();
    for x in aabb.bounds[(0, 0)]..=aabb.bounds[(0, 1)] {
        let r = domain.view(&vector![x, aabb.bounds[(1, 0)]]);
        write!(output, "{r}")?;
        for y in (aabb.bounds[(1, 0)] + 1)..=aabb.bounds[(1, 1)] {
            let r = domain.view(&vector![x, y]);
            write!(output, ", {r}")?;
        }
        writeln!(output)?;
    }
    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn traces_layout() {
        let traces = Traces::from_data(2, 2, vec![1.0, 2.0, 3.0, 4.5]).unwrap();
        let axis = TimeAxis::new(0.0, 0.5, 2).unwrap();
        let mut out = Vec::new();
        write_traces(&traces, &axis, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "time, r0, r1\n0, 1, 2\n0.5, 3, 4.5\n");
    }
}
