mod pr_fixtures;
