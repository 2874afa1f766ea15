//! Output formatting for itineraries and vehicle listings.

use std::fmt::Write as _;
use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use evroute_lib::{Itinerary, LegKind, RouteLeg, Vehicle};

use crate::terminal::{format_minutes, format_with_separators, ColorPalette};

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON on stdout.
    Json,
}

/// Render an itinerary as text.
pub fn render_itinerary_text(itinerary: &Itinerary, palette: &ColorPalette) -> String {
    let p = palette;
    let mut buffer = String::new();
    let _ = writeln!(
        buffer,
        "Trip for {}{}{} (algorithm: {}, avoid tolls: {})",
        p.white_bold,
        itinerary.vehicle,
        p.reset,
        itinerary.algorithm,
        if itinerary.avoid_tolls { "yes" } else { "no" }
    );
    let _ = writeln!(
        buffer,
        "{} -> {} ({} hops, {} charging stops)",
        itinerary.start_station,
        itinerary.goal_station,
        itinerary.hop_count(),
        itinerary.totals.charging_stops
    );
    let _ = writeln!(buffer);

    for leg in &itinerary.legs {
        render_leg(&mut buffer, leg, p);
    }

    let totals = &itinerary.totals;
    let _ = writeln!(buffer);
    let _ = writeln!(buffer, "Total distance: {:.1} km", totals.distance_km);
    let _ = writeln!(buffer, "Drive time: {}", format_minutes(totals.drive_minutes));
    let _ = writeln!(buffer, "Charge time: {}", format_minutes(totals.charge_minutes));
    let _ = writeln!(buffer, "Energy charged: {:.1} kWh", totals.energy_kwh);
    let _ = writeln!(
        buffer,
        "Charging fee: {}",
        format_with_separators(totals.fee.max(0.0).round() as u64)
    );
    buffer
}

fn render_leg(buffer: &mut String, leg: &RouteLeg, p: &ColorPalette) {
    let (tag, color) = match leg.kind {
        LegKind::Departure => ("STRT", p.tag_start),
        LegKind::Arrival => ("GOAL", p.tag_goal),
        LegKind::Station if leg.charge.is_some() => ("CHRG", p.tag_charge),
        LegKind::Station => ("DRIV", p.tag_drive),
    };
    let _ = writeln!(
        buffer,
        "{color}{tag}{reset} {bold}{}{reset} -> {bold}{}{reset}  {:.1} km, {}",
        leg.from,
        leg.to,
        leg.distance_km,
        format_minutes(leg.drive_minutes),
        reset = p.reset,
        bold = p.white_bold,
    );
    if !leg.address.is_empty() {
        let _ = writeln!(buffer, "     {}{}{}", p.gray, leg.address, p.reset);
    }
    let status_color = match leg.charge {
        Some(charge) if charge.billable => p.orange,
        Some(_) => p.green,
        None => "",
    };
    let _ = writeln!(buffer, "     {status_color}{}{}", leg.status, p.reset);
}

/// Print an itinerary as pretty JSON on stdout.
pub fn render_itinerary_json(itinerary: &Itinerary) -> io::Result<()> {
    write_json(itinerary)
}

/// One row of the vehicle listing.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VehicleRow<'a> {
    pub name: &'a str,
    pub max_range_km: f64,
    pub battery_kwh: f64,
    pub consumption_kwh_per_km: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
}

impl<'a> From<&'a Vehicle> for VehicleRow<'a> {
    fn from(vehicle: &'a Vehicle) -> Self {
        Self {
            name: &vehicle.name,
            max_range_km: vehicle.max_range_km,
            battery_kwh: vehicle.battery_kwh,
            consumption_kwh_per_km: vehicle.consumption_kwh_per_km(),
            year: vehicle.year,
        }
    }
}

/// Render the vehicle listing as a text table.
pub fn render_vehicles_text(rows: &[VehicleRow<'_>]) -> String {
    let mut buffer = String::new();
    if rows.is_empty() {
        let _ = writeln!(buffer, "No vehicles available in catalog.");
        return buffer;
    }

    let _ = writeln!(buffer, "Available vehicles ({}):", rows.len());
    let _ = writeln!(
        buffer,
        "{:<24} {:>10} {:>12} {:>8}",
        "Name", "Range (km)", "Battery kWh", "kWh/km"
    );
    for row in rows {
        let _ = writeln!(
            buffer,
            "{:<24} {:>10.0} {:>12.1} {:>8.3}",
            row.name, row.max_range_km, row.battery_kwh, row.consumption_kwh_per_km
        );
    }
    buffer
}

/// Print the vehicle listing as pretty JSON on stdout.
pub fn render_vehicles_json(rows: &[VehicleRow<'_>]) -> io::Result<()> {
    write_json(&rows)
}

fn write_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer_pretty(&mut stdout, value).map_err(io::Error::other)?;
    stdout.write_all(b"\n")?;
    Ok(())
}
