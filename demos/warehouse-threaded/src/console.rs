use std::io;
use std::io::Write;

use crate::vehicle::Vehicle;

/// Prints what `dealer` received.
///
/// Stdout stays locked for the whole report, so reports from concurrent
/// dealers never interleave.
pub fn report(dealer: usize, vehicle: &Vehicle) -> io::Result<()> {
    write_report(&mut io::stdout().lock(), dealer, vehicle)
}

fn write_report(w: &mut impl Write, dealer: usize, vehicle: &Vehicle) -> io::Result<()> {
    writeln!(w, "\n====== Dealer {dealer}:  ======")?;
    writeln!(w, "\n{vehicle}")?;
    // Truck reports end with an extra blank line.
    if let Vehicle::Truck(_) = vehicle {
        writeln!(w)?;
    }
    w.flush()
}
