use criterion::{black_box, criterion_group, criterion_main, Criterion};

use bracket_trends::{
    calculate_win_prob, champion_picks, common_underdogs, upset_summary, AnalysisConfig,
    BracketAnalysis, BracketFactory, BracketPool, Pool, Standings, StandingsBracketFactory,
    StandingsRow, Team, Tournament, TournamentResult,
};

fn create_test_teams() -> (Team, Team) {
    let team1 = Team::new("Duke", 2, "ACC", 0, 24.0);
    let team2 = Team::new("UNC", 7, "ACC", 0, 17.5);
    (team1, team2)
}

fn create_standings() -> Standings {
    Standings::new(
        (0..96)
            .map(|i| StandingsRow {
                team: format!("Team{}", i),
                conference: format!("Conf{}", i % 24),
                rating: 30.0 - i as f64 * 0.35,
            })
            .collect(),
    )
}

fn create_results(n: u64) -> Vec<TournamentResult> {
    let standings = create_standings();
    let factory = StandingsBracketFactory::default();
    (0..n)
        .filter_map(|seed| {
            let mut bracket = factory.create_bracket(&standings, seed).ok()?;
            bracket.set_upset_factor(0.25);
            bracket.simulate_tournament().ok()
        })
        .collect()
}

fn bench_calculate_win_prob(c: &mut Criterion) {
    let (team1, team2) = create_test_teams();

    c.bench_function("calculate_win_prob", |b| {
        b.iter(|| calculate_win_prob(black_box(&team1), black_box(&team2)))
    });
}

fn bench_tournament_sim(c: &mut Criterion) {
    let standings = create_standings();
    let factory = StandingsBracketFactory::default();
    let mut bracket = factory.create_bracket(&standings, 42).unwrap();

    c.bench_function("tournament_64_team_sim", |b| {
        b.iter(|| black_box(&mut bracket).simulate_tournament().unwrap())
    });
}

fn bench_pool(c: &mut Criterion) {
    let standings = create_standings();
    let factory = StandingsBracketFactory::default();

    c.bench_function("pool_10_entries_100_trials", |b| {
        b.iter(|| {
            let mut pool = Pool::new(factory.create_bracket(&standings, 1).unwrap());
            for (j, f) in bracket_trends::upset_factors(10).into_iter().enumerate() {
                let mut entry = factory.create_bracket(&standings, 100 + j as u64).unwrap();
                entry.set_upset_factor(f);
                pool.add_entry(&format!("Entry_{}", j + 1), entry).unwrap();
            }
            pool.simulate_pool(black_box(100)).unwrap()
        })
    });
}

fn bench_analysis(c: &mut Criterion) {
    let results = create_results(1000);

    c.bench_function("upset_summary_1000", |b| {
        b.iter(|| upset_summary(black_box(&results)))
    });

    c.bench_function("common_underdogs_1000", |b| {
        b.iter(|| common_underdogs(black_box(&results), 1000).unwrap())
    });

    c.bench_function("champion_picks_1000", |b| {
        b.iter(|| champion_picks(black_box(&results), 1000).unwrap())
    });
}

fn bench_driver(c: &mut Criterion) {
    // Small run: the full 1000-pool default takes minutes
    let config = AnalysisConfig {
        num_pools: 10,
        entries_per_pool: 5,
        trials_per_pool: 50,
        seed: Some(7),
        ..Default::default()
    };

    c.bench_function("simulate_10_pools", |b| {
        b.iter(|| {
            let mut analysis = BracketAnalysis::new(create_standings(), config.clone()).unwrap();
            analysis.simulate_pools().unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_calculate_win_prob,
    bench_tournament_sim,
    bench_pool,
    bench_analysis,
    bench_driver,
);
criterion_main!(benches);
