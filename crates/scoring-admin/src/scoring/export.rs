use std::io::Write;
use std::path::Path;

use super::domain::ScoringConfig;

#[derive(Debug, thiserror::Error)]
pub enum ScoringConfigExportError {
    #[error("failed to write scoring export: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode scoring CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes a line's scoring configuration as a sectioned CSV sheet, the
/// format the credit team circulates when reviewing rate tables offline.
pub struct ScoringConfigExporter;

impl ScoringConfigExporter {
    pub fn to_path<P: AsRef<Path>>(
        path: P,
        config: &ScoringConfig,
    ) -> Result<(), ScoringConfigExportError> {
        let file = std::fs::File::create(path)?;
        Self::to_writer(file, config)
    }

    pub fn to_writer<W: Write>(
        writer: W,
        config: &ScoringConfig,
    ) -> Result<(), ScoringConfigExportError> {
        let mut csv_writer = csv::WriterBuilder::new().flexible(true).from_writer(writer);

        let line_name = config
            .general
            .line_name
            .as_deref()
            .unwrap_or("(sin nombre)");
        csv_writer.write_record(["linea", line_name])?;

        csv_writer.write_record(["seccion", "niveles_riesgo"])?;
        csv_writer.write_record([
            "nivel",
            "codigo",
            "puntaje_min",
            "puntaje_max",
            "tasa_ea",
            "tasa_nominal_mensual",
            "aval",
            "color",
        ])?;
        for tier in &config.risk_tiers {
            let score_min = tier.score_min.to_string();
            let score_max = tier.score_max.to_string();
            let annual = tier.annual_effective_rate.to_string();
            let monthly = tier.monthly_nominal_rate.to_string();
            let fee = tier.guarantee_fee.to_string();
            csv_writer.write_record([
                tier.name.as_str(),
                tier.code.as_str(),
                score_min.as_str(),
                score_max.as_str(),
                annual.as_str(),
                monthly.as_str(),
                fee.as_str(),
                tier.color.as_str(),
            ])?;
        }

        csv_writer.write_record(["seccion", "factores_rechazo"])?;
        csv_writer.write_record(["criterio", "nombre", "operador", "valor", "mensaje"])?;
        for factor in &config.rejection_factors {
            let threshold = factor.threshold.to_string();
            csv_writer.write_record([
                factor.criterion_key.as_str(),
                factor.label.as_str(),
                factor.operator.symbol(),
                threshold.as_str(),
                factor.message.as_str(),
            ])?;
        }

        csv_writer.write_record(["seccion", "criterios"])?;
        csv_writer.write_record(["codigo", "nombre", "peso", "tipo_campo", "num_rangos"])?;
        for criterion in &config.criteria {
            let weight = criterion.weight.to_string();
            let range_count = criterion.ranges.len().to_string();
            csv_writer.write_record([
                criterion.code.as_str(),
                criterion.name.as_str(),
                weight.as_str(),
                criterion.field_type.label(),
                range_count.as_str(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::defaults;

    fn sample_config() -> ScoringConfig {
        let mut config = ScoringConfig::default();
        config.general.line_name = Some("Microcrédito".to_string());
        config.risk_tiers = defaults::server_default_tiers(25.0);
        config.rejection_factors = defaults::server_default_factors("Microcrédito");
        config.criteria = defaults::master_criteria_catalog();
        config
    }

    #[test]
    fn export_writes_sectioned_sheet() {
        let mut buffer = Vec::new();
        ScoringConfigExporter::to_writer(&mut buffer, &sample_config()).expect("export succeeds");

        let sheet = String::from_utf8(buffer).expect("utf8 output");
        assert!(sheet.starts_with("linea,Microcrédito\n"));
        assert!(sheet.contains("seccion,niveles_riesgo\n"));
        assert!(sheet.contains("seccion,factores_rechazo\n"));
        assert!(sheet.contains("seccion,criterios\n"));
        assert!(sheet.contains("bajo_riesgo"));
    }

    #[test]
    fn export_renders_tier_rates_as_submitted() {
        let mut buffer = Vec::new();
        ScoringConfigExporter::to_writer(&mut buffer, &sample_config()).expect("export succeeds");

        let sheet = String::from_utf8(buffer).expect("utf8 output");
        assert!(sheet.contains("Bajo Riesgo,bajo_riesgo,70.1,100,25,1.8769,0.065,#28a745"));
    }

    #[test]
    fn export_to_path_propagates_io_errors() {
        let error =
            ScoringConfigExporter::to_path("./does-not-exist/config.csv", &sample_config())
                .expect_err("expected io error");

        match error {
            ScoringConfigExportError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
