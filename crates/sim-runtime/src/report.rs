//! KPI derivation, the seven completion-time system tests, deterministic
//! recommendation strings, and the Markdown verdict report (§4.8, §6).

use sim_core::{KpiBlock, SimulationResult, SystemMetrics, SystemTestResults, SystemTestThresholds};

/// Constant LTV/CAC placeholder per §4.8 ("cac = 50, constant placeholder").
pub const CAC_PLACEHOLDER: f64 = 50.0;

/// Counters accumulated over the whole run that the KPI block needs beyond
/// what a single `SystemMetrics` snapshot carries.
#[derive(Clone, Copy, Debug, Default)]
pub struct RunTotals {
    pub signup_events: u64,
    pub churn_events: u64,
    pub total_releases: u64,
    pub viral_releases: u64,
}

/// Derive the KPI block at run completion.
pub fn derive_kpis(initial_users: u64, final_metrics: &SystemMetrics, totals: RunTotals) -> KpiBlock {
    let initial = initial_users.max(1) as f64;
    let final_users = final_metrics.users.total as f64;
    let user_growth_rate = (final_users - initial_users as f64) / initial * 100.0;

    let churn_denominator = (initial_users + totals.signup_events).max(1) as f64;
    let churn_rate = totals.churn_events as f64 / churn_denominator * 100.0;

    let ltv = final_metrics
        .revenue
        .lifetime
        .to_string()
        .parse::<f64>()
        .unwrap_or(0.0)
        / final_metrics.users.total.max(1) as f64;
    let cac = CAC_PLACEHOLDER;

    let viral_coefficient = if totals.total_releases > 0 {
        (totals.viral_releases as f64 / totals.total_releases as f64) * 10.0
    } else {
        0.0
    };

    let nps = 50.0 + user_growth_rate / 10.0 - churn_rate * 2.0;
    let system_uptime = final_metrics.platform.uptime;

    let decisions = final_metrics.autonomous.decisions_auto_made;
    let autonomous_efficiency = if decisions > 0 {
        (decisions as f64 - final_metrics.autonomous.interventions_required as f64) / decisions as f64
            * 100.0
    } else {
        100.0
    };

    KpiBlock {
        user_growth_rate,
        revenue_growth_rate: user_growth_rate,
        churn_rate,
        ltv,
        cac,
        viral_coefficient,
        nps,
        system_uptime,
        autonomous_efficiency,
    }
}

/// Run the seven completion-time system tests, returning the tally plus
/// the deterministic recommendation strings triggered by any failing or
/// warning test.
pub fn run_system_tests(
    initial_users: u64,
    final_metrics: &SystemMetrics,
    kpis: &KpiBlock,
    thresholds: &SystemTestThresholds,
) -> (SystemTestResults, Vec<String>) {
    let mut results = SystemTestResults::default();
    let mut recommendations = Vec::new();

    // 1. user growth > 0
    if kpis.user_growth_rate > 0.0 {
        results.passed += 1;
    } else {
        results.failed += 1;
        recommendations.push("User growth is flat or negative; review acquisition channels.".to_string());
    }

    // 2. mrr > initial_users * mrr_per_user_multiple
    let mrr: f64 = final_metrics.revenue.mrr.to_string().parse().unwrap_or(0.0);
    if mrr > initial_users as f64 * thresholds.mrr_per_user_multiple {
        results.passed += 1;
    } else {
        results.failed += 1;
        recommendations.push("MRR is below the expected multiple of the initial user base.".to_string());
    }

    // 3. uptime
    let uptime = final_metrics.platform.uptime;
    if uptime > thresholds.uptime_pass_pct {
        results.passed += 1;
    } else if uptime > thresholds.uptime_warn_pct {
        results.warnings += 1;
        recommendations.push("Platform uptime is below the target threshold.".to_string());
    } else {
        results.failed += 1;
        results.critical_issues.push("uptime below 99%".to_string());
        recommendations.push("Platform uptime is critically low; investigate system failures.".to_string());
    }

    // 4. error rate
    let error_rate = final_metrics.platform.error_rate;
    if error_rate < thresholds.error_rate_pass {
        results.passed += 1;
    } else if error_rate < thresholds.error_rate_warn {
        results.warnings += 1;
        recommendations.push("Error rate is elevated; monitor third-party dependencies.".to_string());
    } else {
        results.failed += 1;
        results.critical_issues.push("error rate above 5%".to_string());
        recommendations.push("Error rate is critically high; investigate recent system events.".to_string());
    }

    // 5. interventions_required < intervention_ratio_max * decisions_auto_made
    let decisions = final_metrics.autonomous.decisions_auto_made as f64;
    let interventions = final_metrics.autonomous.interventions_required as f64;
    if interventions < thresholds.intervention_ratio_max * decisions {
        results.passed += 1;
    } else {
        results.failed += 1;
        recommendations
            .push("Manual interventions are too frequent relative to autonomous decisions.".to_string());
    }

    // 6. churn
    if kpis.churn_rate < thresholds.churn_pass_pct {
        results.passed += 1;
    } else if kpis.churn_rate < thresholds.churn_warn_pct {
        results.warnings += 1;
        recommendations.push("Churn rate is elevated; review retention tactics.".to_string());
    } else {
        results.failed += 1;
        results.critical_issues.push("churn above 10%".to_string());
        recommendations.push("Churn rate is critically high; prioritize retention work.".to_string());
    }

    // 7. ltv/cac
    let ltv_cac = if kpis.cac > 0.0 { kpis.ltv / kpis.cac } else { 0.0 };
    if ltv_cac > thresholds.ltv_cac_pass {
        results.passed += 1;
    } else if ltv_cac > thresholds.ltv_cac_warn {
        results.warnings += 1;
        recommendations.push("LTV/CAC ratio is marginal; reduce acquisition cost or improve retention.".to_string());
    } else {
        results.failed += 1;
        results.critical_issues.push("ltv/cac below 1".to_string());
        recommendations.push("LTV/CAC ratio is unsustainable; revisit pricing or acquisition spend.".to_string());
    }

    (results, recommendations)
}

/// Render the final Markdown report (§6 "Report format").
pub fn render_markdown(result: &SimulationResult) -> String {
    let verdict = result.verdict();
    let mut out = String::new();

    out.push_str(&format!("# Simulation Report: {}\n\n", result.config.period_name));
    out.push_str("## Executive Summary\n\n");
    out.push_str(&format!("Status: {}\n\n", verdict.label()));
    out.push_str(&format!(
        "Simulated {} days in {:.2}s of real time.\n\n",
        result.simulated_duration_days,
        result.real_duration.as_secs_f64()
    ));

    out.push_str("## Test Results\n\n");
    out.push_str("| Metric | Value |\n|---|---|\n");
    out.push_str(&format!("| Passed | {} |\n", result.system_tests.passed));
    out.push_str(&format!("| Failed | {} |\n", result.system_tests.failed));
    out.push_str(&format!("| Warnings | {} |\n", result.system_tests.warnings));
    if !result.system_tests.critical_issues.is_empty() {
        out.push_str("\nCritical issues:\n");
        for issue in &result.system_tests.critical_issues {
            out.push_str(&format!("- {issue}\n"));
        }
    }
    out.push('\n');

    out.push_str("## KPIs\n\n");
    out.push_str("| KPI | Value |\n|---|---|\n");
    out.push_str(&format!("| User growth rate | {:.2}% |\n", result.kpis.user_growth_rate));
    out.push_str(&format!("| Revenue growth rate | {:.2}% |\n", result.kpis.revenue_growth_rate));
    out.push_str(&format!("| Churn rate | {:.2}% |\n", result.kpis.churn_rate));
    out.push_str(&format!("| LTV | {:.2} |\n", result.kpis.ltv));
    out.push_str(&format!("| CAC | {:.2} |\n", result.kpis.cac));
    out.push_str(&format!("| Viral coefficient | {:.2} |\n", result.kpis.viral_coefficient));
    out.push_str(&format!("| NPS | {:.2} |\n", result.kpis.nps));
    out.push_str(&format!("| System uptime | {:.2}% |\n", result.kpis.system_uptime));
    out.push_str(&format!(
        "| Autonomous efficiency | {:.2}% |\n\n",
        result.kpis.autonomous_efficiency
    ));

    let m = &result.final_metrics;
    out.push_str("## Final Metrics\n\n");
    out.push_str("### Users\n\n");
    out.push_str(&format!(
        "Total {}, active {}, new today {}, churned today {}.\n\n",
        m.users.total, m.users.active, m.users.new_today, m.users.churned_today
    ));
    out.push_str("### Revenue\n\n");
    out.push_str(&format!(
        "Daily {}, monthly {}, yearly {}, lifetime {}, MRR {}, ARR {}.\n\n",
        m.revenue.daily, m.revenue.monthly, m.revenue.yearly, m.revenue.lifetime, m.revenue.mrr, m.revenue.arr
    ));
    out.push_str("### Streams\n\n");
    out.push_str(&format!(
        "Daily {}, monthly {}, total {}, avg per release {:.1}, viral releases {}.\n\n",
        m.streams.daily, m.streams.monthly, m.streams.total, m.streams.avg_per_release, m.streams.viral_releases
    ));
    out.push_str("### Platform\n\n");
    out.push_str(&format!(
        "Uptime {:.2}%, error rate {:.3}, response time {:.0}ms.\n\n",
        m.platform.uptime, m.platform.error_rate, m.platform.response_time_ms
    ));
    out.push_str("### Autonomous\n\n");
    out.push_str(&format!(
        "Auto-published posts {}, auto-launched campaigns {}, decisions {}, interventions {}.\n\n",
        m.autonomous.auto_published_posts,
        m.autonomous.auto_launched_campaigns,
        m.autonomous.decisions_auto_made,
        m.autonomous.interventions_required
    ));

    out.push_str("## Recommendations\n\n");
    if result.recommendations.is_empty() {
        out.push_str("No corrective action recommended.\n\n");
    } else {
        for (idx, rec) in result.recommendations.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", idx + 1, rec));
        }
        out.push('\n');
    }

    out.push_str("## Conclusion\n\n");
    out.push_str(&format!("Final verdict: {}\n", verdict.label()));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use sim_core::SimulationConfig;
    use std::time::Duration;

    fn metrics_with_mrr(mrr: Decimal) -> SystemMetrics {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let mut m = SystemMetrics::new(date, Utc::now());
        m.revenue.mrr = mrr;
        m.revenue.recompute_arr();
        m.users.total = 10_000;
        m.platform.uptime = 99.9;
        m.autonomous.decisions_auto_made = 100;
        m.autonomous.interventions_required = 2;
        m
    }

    #[test]
    fn autonomous_efficiency_is_hundred_when_no_decisions_made() {
        let metrics = SystemMetrics::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), Utc::now());
        let kpis = derive_kpis(100, &metrics, RunTotals::default());
        assert_eq!(kpis.autonomous_efficiency, 100.0);
    }

    #[test]
    fn all_tests_pass_for_healthy_metrics() {
        let metrics = metrics_with_mrr(Decimal::new(100_000, 0));
        let totals = RunTotals {
            signup_events: 500,
            churn_events: 10,
            total_releases: 100,
            viral_releases: 5,
        };
        let kpis = derive_kpis(100, &metrics, totals);
        let (results, _) = run_system_tests(100, &metrics, &kpis, &SystemTestThresholds::default());
        assert_eq!(results.failed, 0);
    }

    #[test]
    fn low_uptime_produces_critical_issue() {
        let mut metrics = metrics_with_mrr(Decimal::new(100_000, 0));
        metrics.platform.uptime = 50.0;
        let kpis = derive_kpis(100, &metrics, RunTotals::default());
        let (results, recs) = run_system_tests(100, &metrics, &kpis, &SystemTestThresholds::default());
        assert!(results.critical_issues.contains(&"uptime below 99%".to_string()));
        assert!(!recs.is_empty());
    }

    #[test]
    fn render_markdown_includes_all_sections() {
        let cfg = SimulationConfig::for_period("1_month").unwrap();
        let metrics = metrics_with_mrr(Decimal::new(100_000, 0));
        let totals = RunTotals {
            signup_events: 500,
            churn_events: 10,
            total_releases: 100,
            viral_releases: 5,
        };
        let kpis = derive_kpis(100, &metrics, totals);
        let (system_tests, recommendations) =
            run_system_tests(100, &metrics, &kpis, &SystemTestThresholds::default());
        let result = SimulationResult {
            config: cfg,
            start_real: Utc::now(),
            end_real: Utc::now(),
            real_duration: Duration::from_secs(1),
            simulated_duration_days: 30,
            final_metrics: metrics,
            snapshots: Vec::new(),
            events: Vec::new(),
            kpis,
            system_tests,
            recommendations,
        };
        let md = render_markdown(&result);
        assert!(md.contains("## Executive Summary"));
        assert!(md.contains("## Test Results"));
        assert!(md.contains("## KPIs"));
        assert!(md.contains("## Final Metrics"));
        assert!(md.contains("## Recommendations"));
        assert!(md.contains("## Conclusion"));
    }
}
