use std::path::{Path, PathBuf};

use eframe::egui::Color32;
use thiserror::Error;

use super::camera::{Bounds, Camera};
use super::config::{ConfigError, GroupStyle, MarkerShape, PlotConfig};
use super::svg;
use crate::color;
use crate::data::error::ReadError;
use crate::data::loader::load_file;
use crate::data::model::{AxisSelector, Dataset};

/// Length of the colour cycle handed out to groups without an explicit colour.
const COLOR_CYCLE: usize = 10;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("highlight index {index} is out of range for a dataset of {len} records")]
    HighlightOutOfRange { index: usize, len: usize },

    #[error("cannot write figure to {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// MarkerGroup – one legend entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerGroup {
    pub label: String,
    pub points: Vec<[f64; 3]>,
    pub color: Color32,
    pub marker: MarkerShape,
    /// Marker radius in px.
    pub size: f32,
}

// ---------------------------------------------------------------------------
// Figure – the scene shared by the SVG writer and the viewer
// ---------------------------------------------------------------------------

/// A 3D scatter plot under construction. Groups draw in insertion order
/// within the legend; markers are depth-sorted when rendered.
#[derive(Debug, Clone)]
pub struct Figure {
    pub config: PlotConfig,
    pub camera: Camera,
    pub groups: Vec<MarkerGroup>,
    cycle: Vec<Color32>,
}

impl Figure {
    pub fn new(config: PlotConfig) -> Self {
        Self {
            camera: Camera::new(config.elevation, config.azimuth),
            config,
            groups: Vec::new(),
            cycle: color::generate_palette(COLOR_CYCLE),
        }
    }

    fn next_color(&self) -> Color32 {
        self.cycle[self.groups.len() % self.cycle.len()]
    }

    /// Add a labelled group. `style` overrides the cycle colour, shape and size.
    pub fn scatter(
        &mut self,
        label: impl Into<String>,
        points: Vec<[f64; 3]>,
        style: Option<&GroupStyle>,
    ) -> &mut MarkerGroup {
        let color = style
            .and_then(|s| s.color.as_deref())
            .and_then(color::parse_hex)
            .unwrap_or_else(|| self.next_color());
        let group = MarkerGroup {
            label: label.into(),
            points,
            color,
            marker: style.map(|s| s.marker).unwrap_or_default(),
            size: style
                .and_then(|s| s.size)
                .unwrap_or(self.config.marker_size),
        };
        self.groups.push(group);
        let last = self.groups.len() - 1;
        &mut self.groups[last]
    }

    /// Add one group for `dataset`, labelled with its source identifier.
    pub fn add_dataset(&mut self, dataset: &Dataset) -> &mut MarkerGroup {
        let xs = dataset.axis(AxisSelector::X);
        let ys = dataset.axis(AxisSelector::Y);
        let zs = dataset.axis(AxisSelector::Z);
        let points: Vec<[f64; 3]> = xs
            .into_iter()
            .zip(ys)
            .zip(zs)
            .map(|((x, y), z)| [x, y, z])
            .collect();

        let style = self.config.group_styles.get(self.groups.len()).cloned();
        self.scatter(dataset.source.clone(), points, style.as_ref())
    }

    /// Emphasize record `index` of `dataset` as its own group labelled `index + 1`.
    pub fn highlight(&mut self, dataset: &Dataset, index: usize) -> Result<(), PlotError> {
        let point = dataset.get(index).ok_or(PlotError::HighlightOutOfRange {
            index,
            len: dataset.len(),
        })?;
        let size = self.config.highlight_size;
        let group = self.scatter((index + 1).to_string(), vec![point], None);
        group.size = size;
        Ok(())
    }

    /// Equal-aspect limits over every group.
    pub fn bounds(&self) -> Bounds {
        Bounds::equal_aspect(self.groups.iter().flat_map(|g| g.points.iter()))
    }

    pub fn render_svg(&self) -> String {
        svg::render(self)
    }

    /// Write to the configured output path, replacing any previous figure.
    pub fn save(&self) -> Result<(), PlotError> {
        let path = self.config.output.clone();
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), PlotError> {
        std::fs::write(path, self.render_svg()).map_err(|source| PlotError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!(
            "Wrote {} groups ({} points) to {}",
            self.groups.len(),
            self.groups.iter().map(|g| g.points.len()).sum::<usize>(),
            path.display()
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Plot every source as one labelled group, highlight `config.highlights`
/// from the first source, and save to `config.output`.
///
/// The returned figure can take further groups before being saved again.
pub fn plot<P: AsRef<Path>>(sources: &[P], config: PlotConfig) -> Result<Figure, PlotError> {
    config.validate()?;
    let mut figure = Figure::new(config);
    let mut reference: Option<Dataset> = None;

    for source in sources {
        let dataset = load_file(source.as_ref())?;
        figure.add_dataset(&dataset);
        if reference.is_none() {
            reference = Some(dataset);
        }
    }

    let reference = reference.unwrap_or_else(|| Dataset::new("", Vec::new()));
    for index in figure.config.highlights.clone() {
        figure.highlight(&reference, index)?;
    }

    figure.save()?;
    Ok(figure)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::data::model::Record;

    fn write_json(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn config_in(dir: &TempDir) -> PlotConfig {
        PlotConfig {
            output: dir.path().join("images.svg"),
            ..Default::default()
        }
    }

    #[test]
    fn test_plot_single_source() {
        let dir = TempDir::new().unwrap();
        let a = write_json(&dir, "a.json", r#"[{"position":[1,2,3]}, {"position":[4,5,6]}]"#);
        let cfg = config_in(&dir);

        let fig = plot(&[&a], cfg.clone()).unwrap();
        assert_eq!(fig.groups.len(), 1);
        assert_eq!(fig.groups[0].label, a.display().to_string());
        assert_eq!(fig.groups[0].points, vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);

        let svg = std::fs::read_to_string(&cfg.output).unwrap();
        assert!(svg.contains(&a.display().to_string()));
        assert_eq!(svg.matches("class=\"marker\"").count(), 2);
    }

    #[test]
    fn test_plot_overwrites_output() {
        let dir = TempDir::new().unwrap();
        let a = write_json(&dir, "a.json", r#"[{"position":[1,2,3]}]"#);
        let b = write_json(&dir, "b.json", r#"[{"position":[7,8,9]}]"#);
        let cfg = config_in(&dir);

        plot(&[&a, &b], cfg.clone()).unwrap();
        plot(&[&a], cfg.clone()).unwrap();
        let svg = std::fs::read_to_string(&cfg.output).unwrap();
        assert!(!svg.contains("b.json"));
    }

    #[test]
    fn test_empty_source_keeps_legend_entry() {
        let dir = TempDir::new().unwrap();
        let empty = write_json(&dir, "empty.json", "[]");

        let fig = plot(&[&empty], config_in(&dir)).unwrap();
        assert_eq!(fig.groups.len(), 1);
        assert!(fig.groups[0].points.is_empty());
        assert_eq!(fig.bounds(), Bounds::default());

        let svg = fig.render_svg();
        assert!(svg.contains("empty.json"));
        assert_eq!(svg.matches("class=\"marker\"").count(), 0);
    }

    #[test]
    fn test_highlights_from_first_source() {
        let dir = TempDir::new().unwrap();
        let p = write_json(
            &dir,
            "p.json",
            r#"[{"position":[0,0,0]}, {"position":[1,1,1]}, {"position":[2,2,2]}]"#,
        );
        let cfg = PlotConfig {
            highlights: vec![1, 2],
            highlight_size: 9.0,
            ..config_in(&dir)
        };

        let fig = plot(&[&p], cfg).unwrap();
        let labels: Vec<&str> = fig.groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels[1..], ["2", "3"]);
        assert_eq!(fig.groups[1].points, vec![[1.0, 1.0, 1.0]]);
        assert_eq!(fig.groups[2].size, 9.0);
        assert_ne!(fig.groups[1].color, fig.groups[2].color);
    }

    #[test]
    fn test_highlight_out_of_range() {
        let dir = TempDir::new().unwrap();
        let p = write_json(&dir, "p.json", r#"[{"position":[0,0,0]}]"#);
        let cfg = PlotConfig {
            highlights: vec![5],
            ..config_in(&dir)
        };

        let err = plot(&[&p], cfg.clone()).unwrap_err();
        assert!(matches!(err, PlotError::HighlightOutOfRange { index: 5, len: 1 }));
        assert!(!cfg.output.exists());
    }

    #[test]
    fn test_read_errors_propagate() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.json");
        let err = plot(&[&missing], config_in(&dir)).unwrap_err();
        assert!(matches!(err, PlotError::Read(ReadError::Io { .. })));
    }

    #[test]
    fn test_group_styles_apply_by_position() {
        let cfg = PlotConfig {
            group_styles: vec![
                GroupStyle::default(),
                GroupStyle {
                    color: Some("#102030".into()),
                    marker: MarkerShape::Triangle,
                    size: Some(4.5),
                },
            ],
            ..Default::default()
        };
        let mut fig = Figure::new(cfg);
        let ds = Dataset::new("d", vec![Record { position: [0.0, 0.0, 0.0] }]);
        fig.add_dataset(&ds);
        fig.add_dataset(&ds);

        assert_eq!(fig.groups[0].marker, MarkerShape::Circle);
        assert_eq!(fig.groups[0].size, 3.0);
        assert_eq!(fig.groups[1].color, Color32::from_rgb(0x10, 0x20, 0x30));
        assert_eq!(fig.groups[1].marker, MarkerShape::Triangle);
        assert_eq!(fig.groups[1].size, 4.5);
    }

    #[test]
    fn test_layering_after_plot_then_resave() {
        let dir = TempDir::new().unwrap();
        let a = write_json(&dir, "a.json", r#"[{"position":[1,2,3]}, {"position":[4,5,6]}]"#);
        let cfg = config_in(&dir);

        let mut fig = plot(&[&a], cfg.clone()).unwrap();
        fig.scatter("extra", vec![[9.0, 9.0, 9.0]], None);
        fig.save().unwrap();

        let svg = std::fs::read_to_string(&cfg.output).unwrap();
        assert!(svg.contains(">extra</text>"));
        assert_eq!(svg.matches("class=\"marker\"").count(), 3);
    }
}
