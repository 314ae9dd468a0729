//! Result serialization: the "external collaborator" named by spec §1/§6.
//!
//! None of this is reachable from, or required by, the optimization core —
//! `Route`/`Track` know nothing about GPX or KML. This module exists so the
//! CLI binary has somewhere to turn a `Vec<Route>` into a file a mapping
//! tool can open.

use crate::geometry::igc_units_to_degrees;
use crate::league::Route;

/// Plain-text table, one line per route, in scoring order.
pub fn to_text(routes: &[Route]) -> String {
    if routes.is_empty() {
        return "no scoreable route found\n".to_string();
    }
    let mut out = String::new();
    for route in routes {
        out.push_str(&format!(
            "{:<45} {:>8.2} km  x{:<4} = {:>8.2} pts  ({} legs{})\n",
            route.route_type,
            route.distance_km,
            route.multiplier,
            route.scored_distance_km(),
            route.waypoints.len().saturating_sub(1),
            if route.circuit { ", closed" } else { "" },
        ));
    }
    out
}

/// GPX 1.1: one `<rte>` per route, its waypoints as `<rtept>` elements.
pub fn to_gpx(routes: &[Route]) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(
        "<gpx version=\"1.1\" creator=\"xcscore\" xmlns=\"http://www.topografix.com/GPX/1/1\">\n",
    );
    for route in routes {
        out.push_str("  <rte>\n");
        out.push_str(&format!(
            "    <name>{} ({:.2} km, x{})</name>\n",
            xml_escape(route.route_type),
            route.distance_km,
            route.multiplier
        ));
        for (trkpt, name) in &route.waypoints {
            let lat = igc_units_to_degrees(trkpt.lat);
            let lon = igc_units_to_degrees(trkpt.lon);
            out.push_str(&format!(
                "    <rtept lat=\"{lat:.6}\" lon=\"{lon:.6}\">\n      <ele>{}</ele>\n      <name>{}</name>\n    </rtept>\n",
                trkpt.ele,
                xml_escape(name),
            ));
        }
        out.push_str("  </rte>\n");
    }
    out.push_str("</gpx>\n");
    out
}

/// KML 2.2: one `<Placemark>` per route, its leg drawn as a `<LineString>`.
pub fn to_kml(routes: &[Route]) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<kml xmlns=\"http://www.opengis.net/kml/2.2\">\n  <Document>\n");
    for route in routes {
        out.push_str("    <Placemark>\n");
        out.push_str(&format!(
            "      <name>{} ({:.2} km, x{})</name>\n",
            xml_escape(route.route_type),
            route.distance_km,
            route.multiplier
        ));
        out.push_str("      <LineString>\n        <coordinates>\n");
        for (trkpt, _) in &route.waypoints {
            let lat = igc_units_to_degrees(trkpt.lat);
            let lon = igc_units_to_degrees(trkpt.lon);
            out.push_str(&format!(
                "          {lon:.6},{lat:.6},{}\n",
                trkpt.ele
            ));
        }
        out.push_str("        </coordinates>\n      </LineString>\n    </Placemark>\n");
    }
    out.push_str("  </Document>\n</kml>\n");
    out
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
