//! Test helpers for running CLI invocations against a scratch database.

use super::*;
use camino::Utf8PathBuf;
use geo::Coord;
use mealdrop_core::test_support::FixedGeocoder;
use serde_json::Value;
use tempfile::TempDir;

pub(super) const KITCHEN_ADDRESS: &str = "1 High St, Leeds";
pub(super) const KITCHEN: Coord<f64> = Coord { x: -1.55, y: 53.8 };
pub(super) const MEAL_DATE: &str = "2099-06-01";

/// Hands out a [`FixedGeocoder`] that knows [`KITCHEN_ADDRESS`].
#[derive(Debug, Clone)]
pub(super) struct FixedGeocoderBuilder {
    geocoder: FixedGeocoder,
}

impl Default for FixedGeocoderBuilder {
    fn default() -> Self {
        Self {
            geocoder: FixedGeocoder::default().with_address(KITCHEN_ADDRESS, KITCHEN),
        }
    }
}

impl GeocoderBuilder for FixedGeocoderBuilder {
    fn build(&self, _config: &ServiceConfig) -> Result<Box<dyn Geocoder>, CliError> {
        Ok(Box::new(self.geocoder.clone()))
    }
}

/// Fails the test if a command asks for a geocoder.
pub(super) struct NoGeocoder;

impl GeocoderBuilder for NoGeocoder {
    fn build(&self, _config: &ServiceConfig) -> Result<Box<dyn Geocoder>, CliError> {
        panic!("command should not need a geocoder");
    }
}

/// A temporary directory holding one database shared by successive commands.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    database: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self {
            database: root.join("mealdrop.db"),
            _dir: dir,
        }
    }

    pub(super) fn argv(&self, args: &[&str]) -> Vec<String> {
        let mut argv = vec![
            "mealdrop".to_owned(),
            format!("--{ARG_DATABASE}"),
            self.database.as_str().to_owned(),
        ];
        argv.extend(args.iter().map(|arg| (*arg).to_owned()));
        argv
    }

    pub(super) fn invoke_with(
        &self,
        args: &[&str],
        geocoders: &dyn GeocoderBuilder,
    ) -> Result<String, CliError> {
        let cli = Cli::try_parse_from(self.argv(args))?;
        let mut buffer = Vec::new();
        run_with(cli, geocoders, &mut buffer)?;
        Ok(String::from_utf8(buffer).expect("utf-8 output"))
    }

    pub(super) fn invoke(&self, args: &[&str]) -> Result<String, CliError> {
        self.invoke_with(args, &FixedGeocoderBuilder::default())
    }

    /// Run a command that must succeed and parse its JSON output.
    pub(super) fn json(&self, args: &[&str]) -> Value {
        let output = self
            .invoke(args)
            .unwrap_or_else(|err| panic!("{args:?} failed: {err}"));
        serde_json::from_str(&output).expect("JSON output")
    }

    /// Create a center, a plan on [`MEAL_DATE`] and one option selling
    /// `max_daily` units. Returns `(center_id, plan_id, option_id)`.
    pub(super) fn seed_option(&self, max_daily: u32) -> (u64, u64, u64) {
        let center = self.json(&[
            "add-center",
            "--name",
            "Central Kitchen",
            "--address",
            KITCHEN_ADDRESS,
            "--phone",
            "0113 496 0000",
        ]);
        let center_id = id_of(&center);
        let plan = self.json(&[
            "add-plan",
            "--center",
            &center_id.to_string(),
            "--name",
            "Daily menu",
            "--date",
            MEAL_DATE,
        ]);
        let plan_id = id_of(&plan);
        let option = self.json(&[
            "add-option",
            "--plan",
            &plan_id.to_string(),
            "--name",
            "Lentil soup",
            "--description",
            "Red lentils and cumin",
            "--price",
            "4.5",
            "--nutrition",
            "320 kcal",
            "--max-daily",
            &max_daily.to_string(),
        ]);
        (center_id, plan_id, id_of(&option))
    }

    /// Save a profile for `user_id` a little north of the kitchen.
    pub(super) fn seed_profile(&self, user_id: u64, latitude_offset: f64) {
        self.json(&[
            "set-profile",
            "--user",
            &user_id.to_string(),
            "--address",
            &format!("{user_id} Park Lane"),
            "--phone",
            "07700 900000",
            "--dietary-notes",
            "None",
            &format!("--longitude={}", KITCHEN.x),
            &format!("--latitude={}", KITCHEN.y + latitude_offset),
        ]);
    }
}

pub(super) fn id_of(value: &Value) -> u64 {
    value["id"].as_u64().expect("record id")
}
