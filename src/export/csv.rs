use crate::error::ExportError;
use crate::model::Floor;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes one row per surface with its floor and zone context.
pub fn export_surfaces_csv<P: AsRef<Path>>(floors: &[Floor], path: P) -> Result<(), ExportError> {
    let path_ref = path.as_ref();
    let file = File::create(path_ref).map_err(|source| ExportError::FileCreate {
        path: path_ref.to_path_buf(),
        source,
    })?;

    write_surfaces(floors, file)
}

/// Same as [`export_surfaces_csv`] but to any writer.
pub fn write_surfaces<W: Write>(floors: &[Floor], out: W) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(out);

    writer.write_record([
        "Floor",
        "Floor Number",
        "Zone",
        "Surface ID",
        "Surface",
        "Type",
        "Area",
        "Construction",
        "Adjacent Zone",
        "Adjacent Surface",
        "Adjacent From",
        "Generated",
    ])?;

    for floor in floors {
        for zone in &floor.zones {
            for surface in &zone.surfaces {
                let floor_number = floor.floor_number.to_string();
                let area = format!("{:.2}", surface.area);
                writer.write_record([
                    floor.floor_name.as_str(),
                    floor_number.as_str(),
                    zone.name.as_str(),
                    surface.id.as_str(),
                    surface.name.as_str(),
                    surface.surface_type.as_str(),
                    area.as_str(),
                    surface.construction_id.as_str(),
                    surface.adjacent_zone_id.as_deref().unwrap_or(""),
                    surface.adjacent_surface_id.as_deref().unwrap_or(""),
                    surface.adjacent_from.as_deref().unwrap_or(""),
                    if surface.is_generated { "yes" } else { "no" },
                ])?;
            }
        }
    }

    writer.flush().map_err(|e| ExportError::WriteError {
        message: e.to_string(),
    })?;

    Ok(())
}
