//! Interactive planning wizard
//!
//! Walks a [`PlanningSession`] through Grunddaten, Gerüstbau, Ausmass and Material
//! with dialoguer prompts. Backend errors are shown and the step is repeated.

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input, MultiSelect, Select};
use geruest_core::models::{ManualHeights, ScaffoldSystem, ScaffoldType, WidthClass, WorkType};
use geruest_core::session::{PlanningSession, WizardStep};
use geruest_core::GeruestError;
use std::path::PathBuf;

use crate::cli::DrawingOptions;
use crate::commands::{new_session, write_export};
use crate::config_loader::AppContext;
use crate::output::{area, metres, OutputWriter};
use crate::output_types::{CatalogRow, FacadeRow, TakeoffRow};
use crate::progress::with_spinner;

/// Navigation choice at the end of a step
enum Nav {
    Next,
    Back,
    Restart,
    Quit,
}

/// Run the wizard until the user quits
pub async fn run_wizard(
    ctx: &AppContext,
    output: &OutputWriter,
    address: Option<String>,
) -> Result<()> {
    println!("\n🏗  Gerüstplanung\n");

    let addresses = ctx.addresses();
    let takeoffs = ctx.takeoffs();
    let mut session = new_session(&ctx.config);
    let mut pending_address = address;

    loop {
        print_progress(session.step());

        let nav = match session.step() {
            WizardStep::Grunddaten => {
                let address = match pending_address.take() {
                    Some(address) => address,
                    None => Input::new().with_prompt("Adresse").interact()?,
                };

                match load_address(ctx, output, &mut session, &address).await {
                    Ok(()) => Nav::Next,
                    // Backend errors repeat the step, prompt errors end the wizard
                    Err(e) => match e.downcast_ref::<GeruestError>() {
                        Some(backend) => {
                            output.warning(backend.user_message());
                            continue;
                        }
                        None => return Err(e),
                    },
                }
            }

            WizardStep::Geruestbau => {
                configure_scaffold(&mut session)?;
                if !select_facades(&mut session)? {
                    output.warning(GeruestError::NoFacadesSelected.user_message());
                    continue;
                }

                output.kv("Abwicklung", metres(session.total_length()));
                output.kv("Gerüsthöhe", metres(session.scaffold_height()));
                output.kv("Fassadenfläche", area(session.total_area()));
                navigate(session.step())?
            }

            WizardStep::Ausmass => {
                let result = with_spinner(
                    true,
                    "Ausmass berechnen...",
                    "Ausmass berechnet",
                    takeoffs.compute_into(&mut session),
                )
                .await;

                match result {
                    Ok(takeoff) => {
                        if takeoff.source == geruest_core::models::TakeoffSource::LocalFallback {
                            output.warning("Server-Berechnung fehlgeschlagen, lokal nach NPK 114 berechnet");
                        }
                        output.table(TakeoffRow::rows(&takeoff));
                        output.kv("Eckzuschlag", area(takeoff.corner_surcharge));
                        output.kv("Total Ausmass", area(takeoff.total_area));
                        navigate(session.step())?
                    }
                    Err(e) => {
                        output.warning(e.user_message());
                        Nav::Back
                    }
                }
            }

            WizardStep::Material => {
                if let Some(estimate) = session.material_estimate() {
                    output.kv("Teile (Richtwert)", estimate.pieces);
                    output.kv("Gewicht (Richtwert)", format!("{:.2} t", estimate.weight_tonnes));
                }

                match takeoffs.material_catalog(&session).await {
                    Ok(catalog) => {
                        output.table(CatalogRow::rows(&catalog));
                        output.kv("Total Gewicht", format!("{:.1} kg", catalog.total_weight_kg));
                    }
                    Err(e) => output.warning(format!("Stückliste nicht verfügbar: {}", e.user_message())),
                }

                if Confirm::new().with_prompt("Ergebnisse exportieren?").default(false).interact()? {
                    let dir: String = Input::new()
                        .with_prompt("Verzeichnis")
                        .default("geruest-export".to_string())
                        .interact()?;
                    let options = DrawingOptions {
                        width: 800,
                        height: 600,
                        professional: true,
                        high_fidelity: false,
                    };
                    let report =
                        write_export(ctx, output, &mut session, &PathBuf::from(dir), &options).await?;
                    for file in &report.files {
                        output.success(file);
                    }
                }

                finish_menu()?
            }
        };

        match nav {
            Nav::Next => {
                if let Err(e) = session.advance() {
                    output.warning(e.user_message());
                }
            }
            Nav::Back => {
                session.back();
            }
            Nav::Restart => {
                addresses.cancel_pending();
                session = new_session(&ctx.config);
            }
            Nav::Quit => return Ok(()),
        }
    }
}

fn print_progress(current: WizardStep) {
    let steps: Vec<String> = WizardStep::ALL
        .iter()
        .map(|step| {
            let label = format!("{}. {}", step.number(), step);
            if *step == current {
                style(label).bold().cyan().to_string()
            } else {
                style(label).dim().to_string()
            }
        })
        .collect();
    println!("\n{}", steps.join("  ›  "));
}

/// Lookup, geometry and optional manual heights for a new address
async fn load_address(
    ctx: &AppContext,
    output: &OutputWriter,
    session: &mut PlanningSession,
    address: &str,
) -> Result<()> {
    let addresses = ctx.addresses();
    let lookup =
        with_spinner(true, "Adresse suchen...", "Adresse gefunden", addresses.lookup(address)).await?;
    let label = lookup.label.clone();

    if let Some(building) = lookup.primary_building() {
        output.kv("EGID", building.egid);
        if let Some(year) = building.construction_year {
            output.kv("Baujahr", year);
        }
    }
    session.start(lookup);

    let geometry = with_spinner(
        true,
        "Gebäudedaten laden...",
        "Gebäudedaten geladen",
        addresses.geometry(&label, None, false),
    )
    .await?;
    session.load_geometry(geometry);

    let heights = session.config().heights;
    let show = |value: Option<f64>| value.map(metres).unwrap_or_else(|| "unbekannt".to_string());
    output.kv("Traufhöhe", show(heights.eave_height_m));
    output.kv("Firsthöhe", show(heights.ridge_height_m));

    if let Some(manual) = prompt_manual_heights()? {
        let geometry = addresses.geometry(&label, Some(&manual), false).await?;
        session.load_geometry(geometry);
        session.set_manual_heights(manual);
    }

    Ok(())
}

fn prompt_manual_heights() -> Result<Option<ManualHeights>> {
    if !Confirm::new().with_prompt("Höhen manuell korrigieren?").default(false).interact()? {
        return Ok(None);
    }

    let eave = optional_metres("Traufhöhe in m (leer = gemessen)")?;
    let ridge = optional_metres("Firsthöhe in m (leer = gemessen)")?;
    let manual = ManualHeights::new(eave, ridge);
    Ok((!manual.is_empty()).then_some(manual))
}

/// Prompt for a height; invalid input is rejected at the prompt and asked again
fn optional_metres(prompt: &str) -> Result<Option<f64>> {
    let raw: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .validate_with(|input: &String| parse_metres(input).map(|_| ()))
        .interact()?;
    parse_metres(&raw).map_err(anyhow::Error::msg)
}

/// Empty means "keep the measured value"; a decimal comma is accepted
fn parse_metres(raw: &str) -> std::result::Result<Option<f64>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.replace(',', ".").parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(Some(value)),
        _ => Err(format!("Ungültige Höhe: {} (positive Zahl in Metern)", raw)),
    }
}

fn configure_scaffold(session: &mut PlanningSession) -> Result<()> {
    let config = session.config().clone();

    let work_types = [WorkType::FacadeWork, WorkType::RoofWork];
    let idx = Select::new()
        .with_prompt("Arbeitsart")
        .items(&["Fassadenarbeiten (bis Traufe)", "Dacharbeiten (über First)"])
        .default(position(&work_types, config.work_type))
        .interact()?;
    session.set_work_type(work_types[idx]);

    let scaffold_types = [ScaffoldType::Working, ScaffoldType::Protective, ScaffoldType::Catch];
    let labels: Vec<&str> = scaffold_types.iter().map(|t| t.label_de()).collect();
    let idx = Select::new()
        .with_prompt("Gerüstart")
        .items(&labels)
        .default(position(&scaffold_types, config.scaffold_type))
        .interact()?;
    session.set_scaffold_type(scaffold_types[idx]);

    let width_classes = [WidthClass::W06, WidthClass::W09, WidthClass::W12];
    let idx = Select::new()
        .with_prompt("Breitenklasse")
        .items(&width_classes)
        .default(position(&width_classes, config.width_class))
        .interact()?;
    session.set_width_class(width_classes[idx]);

    let systems = [ScaffoldSystem::Blitz70, ScaffoldSystem::Allround];
    let labels: Vec<&str> = systems.iter().map(|s| s.display_name()).collect();
    let idx = Select::new()
        .with_prompt("System")
        .items(&labels)
        .default(position(&systems, config.system))
        .interact()?;
    session.set_system(systems[idx]);

    Ok(())
}

/// Returns false when the user left every facade unchecked
fn select_facades(session: &mut PlanningSession) -> Result<bool> {
    let selection = session.selection();
    for side in selection.sides().iter().filter(|s| !s.is_selectable()) {
        tracing::debug!(index = side.index, length = side.length_m, "Facade too short to select");
    }

    let selectable: Vec<_> = selection.selectable_sides().cloned().collect();
    let labels: Vec<String> = selectable
        .iter()
        .map(|side| {
            let row = FacadeRow::new(side, false);
            format!("#{} {} {}", row.index, row.direction, row.length)
        })
        .collect();
    let defaults: Vec<bool> = selectable.iter().map(|s| selection.is_selected(s.index)).collect();

    let chosen = MultiSelect::new()
        .with_prompt("Fassaden (Leertaste wählt, Enter bestätigt)")
        .items(&labels)
        .defaults(&defaults)
        .interact()?;

    if chosen.len() == selectable.len() {
        session.select_all();
    } else {
        session.select_facades(chosen.iter().map(|&i| selectable[i].index))?;
    }

    Ok(!session.selection().is_empty())
}

fn navigate(step: WizardStep) -> Result<Nav> {
    let next = match step.next() {
        Some(next) => format!("Weiter zu {}", next),
        None => "Weiter".to_string(),
    };
    let idx = Select::new()
        .with_prompt("Weiter?")
        .items(&[next.as_str(), "Zurück", "Neue Adresse", "Beenden"])
        .default(0)
        .interact()?;

    Ok(match idx {
        0 => Nav::Next,
        1 => Nav::Back,
        2 => Nav::Restart,
        _ => Nav::Quit,
    })
}

fn finish_menu() -> Result<Nav> {
    let idx = Select::new()
        .with_prompt("Planung abgeschlossen")
        .items(&["Beenden", "Zurück zum Ausmass", "Neue Adresse"])
        .default(0)
        .interact()?;

    Ok(match idx {
        1 => Nav::Back,
        2 => Nav::Restart,
        _ => Nav::Quit,
    })
}

fn position<T: PartialEq + Copy>(options: &[T], current: T) -> usize {
    options.iter().position(|o| *o == current).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_defaults_to_first() {
        let classes = [WidthClass::W06, WidthClass::W09, WidthClass::W12];
        assert_eq!(position(&classes, WidthClass::W12), 2);
        assert_eq!(position(&[WorkType::RoofWork], WorkType::FacadeWork), 0);
    }

    #[test]
    fn test_parse_metres_accepts_heights() {
        assert_eq!(parse_metres("").unwrap(), None);
        assert_eq!(parse_metres("   ").unwrap(), None);
        assert_eq!(parse_metres("7.5").unwrap(), Some(7.5));
        assert_eq!(parse_metres(" 10,25 ").unwrap(), Some(10.25));
    }

    #[test]
    fn test_parse_metres_rejects_invalid_input() {
        for raw in ["abc", "-3", "0", "inf", "NaN", "7.5m"] {
            let err = parse_metres(raw).unwrap_err();
            assert!(err.contains("Ungültige Höhe"), "{} gave {}", raw, err);
        }
    }
}
